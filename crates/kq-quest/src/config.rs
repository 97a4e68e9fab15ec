//! Configuration for the quest engine.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use kq_core::{DEFAULT_UTC_OFFSET_HOURS, offset_from_hours};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::reward::ComboTable;

/// Engine settings.
#[derive(Debug, Clone)]
pub struct QuestConfig {
    /// RNG seed for reproducible scenes and rewards; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Local offset from UTC in hours.
    pub utc_offset_hours: i32,
    /// How many past choices a session remembers.
    pub history_len: usize,
    /// Idle time after which a session is discarded.
    pub session_lifetime: Duration,
    /// How long a CSRF token stays valid.
    pub csrf_lifetime: Duration,
    /// Days of daily statistics to keep.
    pub stats_retention_days: u64,
    /// Combo patterns checked after each choice.
    pub combos: ComboTable,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            seed: None,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            history_len: 10,
            session_lifetime: Duration::from_secs(86_400),
            csrf_lifetime: Duration::from_secs(3_600),
            stats_retention_days: 30,
            combos: ComboTable::default(),
        }
    }
}

impl QuestConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the local UTC offset in hours.
    pub fn with_utc_offset_hours(mut self, hours: i32) -> Self {
        self.utc_offset_hours = hours;
        self
    }

    /// Set the history length (at least 3, so combos can match).
    pub fn with_history_len(mut self, len: usize) -> Self {
        self.history_len = len.max(3);
        self
    }

    /// Set the session lifetime.
    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    /// Set the CSRF token lifetime.
    pub fn with_csrf_lifetime(mut self, lifetime: Duration) -> Self {
        self.csrf_lifetime = lifetime;
        self
    }

    /// Set how many days of statistics to keep.
    pub fn with_stats_retention_days(mut self, days: u64) -> Self {
        self.stats_retention_days = days;
        self
    }

    /// Replace the combo table.
    pub fn with_combos(mut self, combos: ComboTable) -> Self {
        self.combos = combos;
        self
    }

    /// The configured local offset.
    pub fn offset(&self) -> FixedOffset {
        offset_from_hours(self.utc_offset_hours)
    }

    /// Convert a UTC instant to local time.
    pub fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.offset())
    }

    /// An RNG for this configuration.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn default_config() {
        let cfg = QuestConfig::default();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.history_len, 10);
        assert_eq!(cfg.session_lifetime, Duration::from_secs(86_400));
        assert_eq!(cfg.csrf_lifetime, Duration::from_secs(3_600));
        assert_eq!(cfg.stats_retention_days, 30);
        assert_eq!(cfg.combos.patterns().len(), 4);
    }

    #[test]
    fn builder_methods() {
        let cfg = QuestConfig::default()
            .with_seed(7)
            .with_utc_offset_hours(0)
            .with_history_len(1);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.utc_offset_hours, 0);
        assert_eq!(cfg.history_len, 3);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let cfg = QuestConfig::default().with_seed(99);
        let a: u64 = cfg.rng().random();
        let b: u64 = cfg.rng().random();
        assert_eq!(a, b);
    }
}
