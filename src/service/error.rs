use std::time::Duration;

use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
/// Errors that fail a single match request.
pub enum MatchError {
    /// The query could not be embedded.
    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Query embedding took longer than the configured limit.
    #[error("query embedding timed out after {timeout:?}")]
    EmbeddingTimeout {
        /// Configured limit.
        timeout: Duration,
    },

    /// The blocking embedding task panicked or was cancelled.
    #[error("embedding task failed: {reason}")]
    TaskFailed {
        /// Error message.
        reason: String,
    },
}

/// Convenience result type for match requests.
pub type MatchServiceResult<T> = Result<T, MatchError>;
