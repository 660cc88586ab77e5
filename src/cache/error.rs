use thiserror::Error;

use crate::corpus::CorpusError;
use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
/// Errors returned while (re)loading the corpus snapshot.
pub enum CacheError {
    /// Reading the corpus failed (unreachable, timed out, or empty).
    #[error("corpus load failed: {0}")]
    Corpus(#[from] CorpusError),

    /// Embedding corpus rows failed.
    #[error("corpus embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The blocking embedding task panicked or was cancelled.
    #[error("embedding task failed: {reason}")]
    TaskFailed {
        /// Error message.
        reason: String,
    },
}

/// Convenience result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
