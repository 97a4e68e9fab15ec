//! Error types for core values.

/// Alias for `Result<T, KqError>`.
pub type KqResult<T> = Result<T, KqError>;

/// Errors raised when parsing or validating core values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KqError {
    /// The OPI is not an integer in 0..=100.
    #[error("invalid OPI: \"{0}\"")]
    InvalidOpi(String),

    /// The choice key does not match `(stay|out)_[a-z]+`.
    #[error("invalid choice: \"{0}\"")]
    InvalidChoice(String),
}
