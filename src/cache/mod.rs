//! Corpus snapshot cache and the match memo.

mod corpus_cache;
mod error;
mod memo;


pub use corpus_cache::{CacheConfig, CorpusCache, RefreshOutcome, is_stale};
pub use error::{CacheError, CacheResult};
pub use memo::MatchMemo;
