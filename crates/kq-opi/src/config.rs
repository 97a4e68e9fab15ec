//! Configuration for the OPI provider.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use kq_core::{DEFAULT_UTC_OFFSET_HOURS, offset_from_hours};

/// Provider and cache settings.
#[derive(Debug, Clone)]
pub struct OpiConfig {
    /// Endpoint URL; `None` means always fall back.
    pub endpoint: Option<String>,
    /// Bearer token sent with each request.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total attempts per fetch (at least 1).
    pub max_attempts: u32,
    /// Base delay between attempts; attempt `n` waits `n × retry_delay`.
    pub retry_delay: Duration,
    /// How long a successful reading stays cached.
    pub cache_ttl: Duration,
    /// Local offset from UTC in hours, used for cache keys and fallback.
    pub utc_offset_hours: i32,
}

impl Default for OpiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout: Duration::from_secs(5),
            max_attempts: 3,
            retry_delay: Duration::from_millis(1000),
            cache_ttl: Duration::from_secs(3600),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl OpiConfig {
    /// Set the endpoint. Blank strings leave it unconfigured.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.endpoint = (!url.trim().is_empty()).then_some(url);
        self
    }

    /// Set the bearer token. Blank strings send no token.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of attempts (clamped to at least 1).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the base retry delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the local UTC offset in hours.
    pub fn with_utc_offset_hours(mut self, hours: i32) -> Self {
        self.utc_offset_hours = hours;
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
}
