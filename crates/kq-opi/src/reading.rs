//! Cache-first OPI lookup.

use chrono::{DateTime, Utc};
use kq_core::{OpiReading, OpiSource};
use rand::rngs::StdRng;

use crate::cache::FileCache;
use crate::config::OpiConfig;
use crate::provider::{FetchOutcome, OpiProvider};

/// Cache key for the local hour containing `now`: `opi_YYYYMMDDHH`.
pub fn cache_key(config: &OpiConfig, now: DateTime<Utc>) -> String {
    format!("opi_{}", config.local(now).format("%Y%m%d%H"))
}

/// The reading for `now`: from the cache when this hour was already
/// fetched, otherwise from the provider.
///
/// Only readings that came from the API are cached, so a fallback is
/// retried on the next call. Cache write failures are logged and ignored.
pub async fn current_reading(
    provider: &OpiProvider,
    cache: &FileCache,
    now: DateTime<Utc>,
    rng: &mut StdRng,
) -> FetchOutcome {
    let key = cache_key(provider.config(), now);

    if let Some(reading) = cache.get_at::<OpiReading>(&key, now) {
        tracing::debug!(key, opi = reading.value.value(), "OPI cache hit");
        return FetchOutcome {
            reading: reading.with_source(OpiSource::Cache),
            attempts: 0,
            failure: None,
        };
    }

    let outcome = provider.fetch(now, rng).await;
    if outcome.reading.source == OpiSource::Api
        && let Err(err) = cache.set_at(&key, &outcome.reading, provider.config().cache_ttl, now)
    {
        tracing::warn!(key, error = %err, "failed to cache OPI reading");
    }
    outcome
}
