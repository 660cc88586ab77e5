//! Exact-repeat memo for match results.
//!
//! Keys pair the snapshot generation with a BLAKE3 hash of the query text, so
//! a result is only ever reused against the snapshot it was computed on.

use moka::sync::Cache;

use crate::hashing::hash_query;
use crate::matching::MatchResult;

type MemoKey = (u64, [u8; 32]);

/// Bounded in-memory map from `(generation, query)` to [`MatchResult`].
#[derive(Clone)]
pub struct MatchMemo {
    entries: Cache<MemoKey, MatchResult>,
}

impl MatchMemo {
    /// Creates a memo with a max entry capacity.
    #[inline]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    #[inline]
    pub fn get(&self, generation: u64, query: &str) -> Option<MatchResult> {
        self.entries.get(&(generation, hash_query(query)))
    }

    #[inline]
    pub fn insert(&self, generation: u64, query: &str, result: MatchResult) {
        self.entries.insert((generation, hash_query(query)), result);
    }

    /// Drops everything (called when a new snapshot is installed).
    #[inline]
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Returns the number of cached entries (approximate until pending tasks run).
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    /// Runs any pending maintenance tasks in the underlying cache.
    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl std::fmt::Debug for MatchMemo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchMemo")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
