//! Factmatch library crate (used by the server binary and integration tests).
//!
//! Matches a short suspicious message against a corpus of fact-checked items
//! and returns the best item with its similarity, or no match.
//!
//! ## Request path
//! - [`MatchService`] runs one request: refresh check, snapshot capture,
//!   query embedding, then the two-tier policy in [`SimilarityMatcher`].
//! - [`CorpusCache`] owns the current [`CorpusSnapshot`] and reloads it when the
//!   [`FreshnessSignal`] reports a newer corpus.
//! - [`gateway`] exposes the service over HTTP.
//!
//! ## Collaborators
//! - [`Embedder`]: fastText vectors ([`FastTextEmbedder`]) or a deterministic stub.
//! - [`CorpusStore`]: MySQL ([`MySqlCorpusStore`]).
//! - [`FreshnessStore`]: Redis ([`RedisFreshnessStore`]).
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod corpus;
pub mod embedding;
pub mod freshness;
pub mod gateway;
pub mod hashing;
pub mod matching;
pub mod service;

pub use cache::{CacheConfig, CacheError, CorpusCache, MatchMemo, RefreshOutcome};
pub use config::{Config, ConfigError};
pub use constants::{FRESHNESS_LOGICAL_NAME, PRIMARY_THRESHOLD, SECONDARY_THRESHOLD};
#[cfg(any(test, feature = "mock"))]
pub use corpus::MockCorpusStore;
pub use corpus::{
    CorpusEntry, CorpusError, CorpusSnapshot, CorpusStore, IndexedEntry, MySqlCorpusStore,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::LookupEmbedder;
pub use embedding::{
    Embedder, EmbedderConfig, EmbeddingError, FastTextEmbedder, StubEmbedder, load_embedder,
};
#[cfg(any(test, feature = "mock"))]
pub use freshness::MockFreshnessStore;
pub use freshness::{
    FreshnessError, FreshnessSignal, FreshnessStore, RedisFreshnessStore, UpdateTimestamp,
};
pub use hashing::{freshness_key, hash_query};
pub use matching::{MatchResult, MatchTier, MatcherConfig, SimilarityMatcher};
pub use service::{MatchError, MatchService};
