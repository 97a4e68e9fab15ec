use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::error::{KqError, KqResult};

/// The Outing Pressure Index: a congestion score in `0..=100`.
///
/// Every constructor clamps, so an `Opi` is always in range. Deserializing
/// an out-of-range number clamps as well.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "i64", into = "i64")]
pub struct Opi(u8);

impl Opi {
    /// Lowest possible index.
    pub const MIN: Self = Self(0);
    /// Highest possible index.
    pub const MAX: Self = Self(100);

    /// Build an index, clamping into `0..=100`.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// Build an index from a float, truncating toward zero and clamping.
    ///
    /// Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Some(Self::new(value.trunc() as i64))
    }

    /// Strictly parse a submitted value: an integer in `0..=100`, no clamping.
    pub fn parse(input: &str) -> KqResult<Self> {
        let trimmed = input.trim();
        match trimmed.parse::<i64>() {
            Ok(v) if (0..=100).contains(&v) => Ok(Self(v as u8)),
            _ => Err(KqError::InvalidOpi(input.to_string())),
        }
    }

    /// The raw value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// The difficulty tier for this index.
    pub fn difficulty(self) -> Difficulty {
        Difficulty::classify(self)
    }
}

impl From<i64> for Opi {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Opi> for i64 {
    fn from(opi: Opi) -> Self {
        i64::from(opi.0)
    }
}

impl FromStr for Opi {
    type Err = KqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Opi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpiSource {
    /// Fetched from the external endpoint just now.
    Api,
    /// Served from the local cache.
    Cache,
    /// Fabricated locally because the endpoint was unavailable.
    Fallback,
}

impl fmt::Display for OpiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Cache => write!(f, "cache"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// A single OPI observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpiReading {
    /// The index value.
    pub value: Opi,
    /// Where the value came from.
    pub source: OpiSource,
    /// When the value was obtained.
    pub timestamp: DateTime<Utc>,
}

impl OpiReading {
    /// Create a reading.
    pub fn new(value: Opi, source: OpiSource, timestamp: DateTime<Utc>) -> Self {
        Self {
            value,
            source,
            timestamp,
        }
    }

    /// The same reading, relabelled with a different source.
    pub fn with_source(mut self, source: OpiSource) -> Self {
        self.source = source;
        self
    }

    /// Whether the value was fabricated rather than observed.
    pub fn is_offline(&self) -> bool {
        self.source == OpiSource::Fallback
    }

    /// The difficulty tier for this reading.
    pub fn difficulty(&self) -> Difficulty {
        self.value.difficulty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_clamps() {
        assert_eq!(Opi::new(-5).value(), 0);
        assert_eq!(Opi::new(42).value(), 42);
        assert_eq!(Opi::new(250).value(), 100);
    }

    #[test]
    fn from_f64_truncates_and_rejects_non_finite() {
        assert_eq!(Opi::from_f64(72.9), Some(Opi::new(72)));
        assert_eq!(Opi::from_f64(130.0), Some(Opi::MAX));
        assert_eq!(Opi::from_f64(f64::NAN), None);
        assert_eq!(Opi::from_f64(f64::INFINITY), None);
    }

    #[test]
    fn parse_is_strict() {
        assert_eq!(Opi::parse("35").unwrap().value(), 35);
        assert_eq!(Opi::parse(" 100 ").unwrap().value(), 100);
        assert!(Opi::parse("101").is_err());
        assert!(Opi::parse("-1").is_err());
        assert!(Opi::parse("abc").is_err());
        assert!(Opi::parse("").is_err());
    }

    #[test]
    fn serde_clamps_out_of_range() {
        let opi: Opi = serde_json::from_str("180").unwrap();
        assert_eq!(opi, Opi::MAX);
        assert_eq!(serde_json::to_string(&Opi::new(7)).unwrap(), "7");
    }

    #[test]
    fn reading_offline_only_for_fallback() {
        let now = Utc::now();
        let reading = OpiReading::new(Opi::new(50), OpiSource::Api, now);
        assert!(!reading.is_offline());
        assert!(!reading.clone().with_source(OpiSource::Cache).is_offline());
        assert!(reading.with_source(OpiSource::Fallback).is_offline());
    }

    #[test]
    fn source_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&OpiSource::Fallback).unwrap(),
            "\"fallback\""
        );
    }

    proptest! {
        #[test]
        fn any_integer_lands_in_range(v in any::<i64>()) {
            let opi = Opi::new(v);
            prop_assert!(opi.value() <= 100);
        }

        #[test]
        fn any_finite_float_lands_in_range(v in -1.0e12f64..1.0e12) {
            let opi = Opi::from_f64(v).unwrap();
            prop_assert!(opi.value() <= 100);
        }
    }
}
