use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned while reading the corpus.
pub enum CorpusError {
    /// The store could not be reached or the query failed.
    #[error("corpus store unavailable: {reason}")]
    Unavailable {
        /// Error message.
        reason: String,
    },

    /// The store did not answer in time.
    #[error("corpus store timed out after {timeout:?}")]
    Timeout {
        /// Configured limit.
        timeout: Duration,
    },

    /// The query succeeded but returned nothing.
    #[error("corpus store returned no rows")]
    Empty,

    /// A configured source table is not a plain identifier.
    #[error("invalid source table name '{name}'")]
    InvalidTable {
        /// Offending name.
        name: String,
    },

    /// Entries and vectors could not be paired into a snapshot.
    #[error("inconsistent snapshot: {reason}")]
    Inconsistent {
        /// Error message.
        reason: String,
    },
}

impl From<sqlx::Error> for CorpusError {
    fn from(err: sqlx::Error) -> Self {
        CorpusError::Unavailable {
            reason: err.to_string(),
        }
    }
}

/// Convenience result type for corpus operations.
pub type CorpusResult<T> = Result<T, CorpusError>;
