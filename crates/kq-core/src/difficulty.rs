//! Difficulty tiers.
//!
//! The tier is a pure function of the OPI with fixed thresholds. Tiers are
//! totally ordered from `Peace` (quiet outside) to `Hell` (packed outside).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::opi::Opi;

/// How hostile the outside world is right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// OPI below 30.
    Peace,
    /// OPI 30..=49.
    Calm,
    /// OPI 50..=79.
    Warning,
    /// OPI 80 and above.
    Hell,
}

impl Difficulty {
    /// Lowest OPI classified as `Hell`.
    pub const HELL_THRESHOLD: u8 = 80;
    /// Lowest OPI classified as `Warning`.
    pub const WARNING_THRESHOLD: u8 = 50;
    /// Lowest OPI classified as `Calm`.
    pub const CALM_THRESHOLD: u8 = 30;

    /// Classify an OPI into a tier.
    pub fn classify(opi: Opi) -> Self {
        match opi.value() {
            v if v >= Self::HELL_THRESHOLD => Self::Hell,
            v if v >= Self::WARNING_THRESHOLD => Self::Warning,
            v if v >= Self::CALM_THRESHOLD => Self::Calm,
            _ => Self::Peace,
        }
    }

    /// All tiers in order of increasing severity.
    pub fn all() -> &'static [Self] {
        &[Self::Peace, Self::Calm, Self::Warning, Self::Hell]
    }

    /// Experience multiplier applied to an action's base reward.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Hell => 2.5,
            Self::Warning => 2.0,
            Self::Calm => 1.5,
            Self::Peace => 1.0,
        }
    }

    /// Machine name, as used in forms and statistics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Peace => "peace",
            Self::Calm => "calm",
            Self::Warning => "warning",
            Self::Hell => "hell",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hell => "Mayhem",
            Self::Warning => "On Guard",
            Self::Calm => "Breeze",
            Self::Peace => "Stillness",
        }
    }

    /// One-line advice for the tier.
    pub fn tip(self) -> &'static str {
        match self {
            Self::Hell => "Going out is high risk. Staying in is the optimal play.",
            Self::Warning => "Crowds expected. Tread carefully.",
            Self::Calm => "Things are fairly empty out there.",
            Self::Peace => "A quiet hour.",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify an OPI into a difficulty tier.
pub fn classify_difficulty(opi: Opi) -> Difficulty {
    Difficulty::classify(opi)
}
