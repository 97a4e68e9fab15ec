//! Local time-of-day buckets and the fixed UTC offset used for them.

use std::fmt;

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Coarse bucket of the local wall-clock hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 05:00 to 11:59.
    Morning,
    /// 12:00 to 16:59.
    Noon,
    /// 17:00 to 20:59.
    Evening,
    /// 21:00 to 04:59.
    Night,
}

impl TimeOfDay {
    /// Bucket an hour in `0..24`. Out-of-range hours count as night.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Noon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    /// Bucket a local datetime.
    pub fn of<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Self::from_hour(at.hour())
    }

    /// Machine name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Noon => "noon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Default local offset from UTC, in hours (Japan Standard Time).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

/// A fixed offset `hours` east of UTC; out-of-range values fall back to UTC.
pub fn offset_from_hours(hours: i32) -> FixedOffset {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}
