//! Error types for the quest engine.

use thiserror::Error;

/// Result type for quest operations.
pub type QuestResult<T> = Result<T, QuestError>;

/// Errors from session storage and statistics.
///
/// Bad form input is not an error here; it becomes a
/// [`Rejection`](crate::validate::Rejection).
#[derive(Debug, Error)]
pub enum QuestError {
    /// Filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be read or written as JSON.
    #[error("storage format error: {0}")]
    Json(#[from] serde_json::Error),

    /// A session id that cannot name a stored session.
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),
}
