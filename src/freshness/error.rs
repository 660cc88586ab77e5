use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the freshness store and signal.
pub enum FreshnessError {
    /// The store could not be reached or rejected the command.
    #[error("freshness store unavailable: {reason}")]
    Unavailable {
        /// Error message.
        reason: String,
    },

    /// The store did not answer in time.
    #[error("freshness store timed out after {timeout:?}")]
    Timeout {
        /// Configured limit.
        timeout: Duration,
    },

    /// The stored value is not a `YYYY-MM-DD HH:MM` timestamp.
    #[error("invalid update timestamp '{value}': {reason}")]
    InvalidTimestamp {
        /// Raw stored value.
        value: String,
        /// Parser message.
        reason: String,
    },
}

impl From<redis::RedisError> for FreshnessError {
    fn from(err: redis::RedisError) -> Self {
        FreshnessError::Unavailable {
            reason: err.to_string(),
        }
    }
}

/// Convenience result type for freshness operations.
pub type FreshnessResult<T> = Result<T, FreshnessError>;
