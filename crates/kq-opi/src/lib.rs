//! OPI provider and flat-file TTL cache.
//!
//! Fetches the Outing Pressure Index from an external JSON endpoint with
//! retries, understands several response schemas, and fabricates a
//! plausible value from the local time when the endpoint is unreachable.
//! Successful readings are cached on disk for an hour.

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod provider;
pub mod reading;

pub use cache::FileCache;
pub use config::OpiConfig;
pub use error::{FetchFailure, OpiError, OpiResult};
pub use provider::{FetchOutcome, OpiProvider};
pub use reading::current_reading;
