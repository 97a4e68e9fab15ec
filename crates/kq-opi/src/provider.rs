//! HTTP fetch with linear-backoff retry and a fabricated fallback.
//!
//! [`OpiProvider::fetch`] never fails: whatever happens on the wire, the
//! caller gets a reading. When every attempt fails the reading comes from
//! [`fallback_opi`](crate::fallback::fallback_opi) and the last failure is
//! attached to the outcome.

use chrono::{DateTime, Utc};
use kq_core::{Opi, OpiReading, OpiSource};
use rand::rngs::StdRng;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use serde_json::Value;

use crate::config::OpiConfig;
use crate::error::{FetchFailure, OpiError, OpiResult};
use crate::extract::opi_from_json;
use crate::fallback::fallback_opi;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("KodokuQuest/", env!("CARGO_PKG_VERSION"));

/// What a fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// The reading, from the API or the fallback.
    pub reading: OpiReading,
    /// Requests actually sent (0 when no endpoint is configured).
    pub attempts: u32,
    /// The last failure, when the reading is a fallback.
    pub failure: Option<FetchFailure>,
}

impl FetchOutcome {
    /// Whether the reading came from the API.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Client for the external OPI endpoint.
#[derive(Debug, Clone)]
pub struct OpiProvider {
    config: OpiConfig,
    client: reqwest::Client,
}

impl OpiProvider {
    /// Build a provider. Fails only if the TLS/HTTP client cannot be set up.
    pub fn new(config: OpiConfig) -> OpiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| OpiError::Client(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// The provider's configuration.
    pub fn config(&self) -> &OpiConfig {
        &self.config
    }

    /// Fetch the current OPI, retrying and falling back as needed.
    pub async fn fetch(&self, now: DateTime<Utc>, rng: &mut StdRng) -> FetchOutcome {
        let Some(url) = self.config.endpoint.as_deref() else {
            tracing::debug!("no OPI endpoint configured, using fallback");
            return self.fallback(now, rng, 0, FetchFailure::NotConfigured);
        };

        let max = self.config.max_attempts.max(1);
        let mut last = FetchFailure::NoSignal;
        for attempt in 1..=max {
            match self.fetch_once(url).await {
                Ok(value) => {
                    tracing::debug!(attempt, opi = value.value(), "OPI fetched");
                    return FetchOutcome {
                        reading: OpiReading::new(value, OpiSource::Api, now),
                        attempts: attempt,
                        failure: None,
                    };
                }
                Err(failure) => {
                    tracing::warn!(attempt, max, error = %failure, "OPI fetch attempt failed");
                    last = failure;
                    if attempt < max {
                        tokio::time::sleep(self.config.retry_delay * attempt).await;
                    }
                }
            }
        }

        self.fallback(now, rng, max, last)
    }

    /// One request, no retry.
    pub async fn fetch_once(&self, url: &str) -> Result<Opi, FetchFailure> {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, "ja,en")
            .header(CACHE_CONTROL, "no-cache");
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchFailure::Request(e.to_string()))?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchFailure::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchFailure::Request(e.to_string()))?;
        let json: Value =
            serde_json::from_str(&body).map_err(|e| FetchFailure::Json(e.to_string()))?;
        opi_from_json(&json)
    }

    fn fallback(
        &self,
        now: DateTime<Utc>,
        rng: &mut StdRng,
        attempts: u32,
        failure: FetchFailure,
    ) -> FetchOutcome {
        let value = fallback_opi(&self.config.local(now), rng);
        FetchOutcome {
            reading: OpiReading::new(value, OpiSource::Fallback, now),
            attempts,
            failure: Some(failure),
        }
    }
}
