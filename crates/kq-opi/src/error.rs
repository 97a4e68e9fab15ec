//! Error types for the OPI provider and cache.

use thiserror::Error;

/// Result type for cache operations.
pub type OpiResult<T> = Result<T, OpiError>;

/// Errors from local storage. Network problems are never errors; see
/// [`FetchFailure`].
#[derive(Debug, Error)]
pub enum OpiError {
    /// Filesystem failure.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized.
    #[error("cache serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Why a fetch produced no usable value.
///
/// Carried alongside the fallback reading so callers can log or display it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// No endpoint URL is configured.
    #[error("API URL not configured")]
    NotConfigured,

    /// The request did not complete (connect error, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-200 status.
    #[error("HTTP {0}")]
    HttpStatus(u16),

    /// The body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(String),

    /// The JSON held none of the recognized fields.
    #[error("no recognized OPI field in response")]
    NoSignal,

    /// A recognized field held something that is not a finite number.
    #[error("invalid OPI value: {0}")]
    InvalidValue(String),
}
