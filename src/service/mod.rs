//! The exposed `match` operation.
//!
//! One request: refresh check, capture the snapshot, embed the query, then
//! classify and select against that captured snapshot.

mod error;


use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, instrument, warn};

pub use error::{MatchError, MatchServiceResult};

use crate::cache::{CorpusCache, MatchMemo, RefreshOutcome};
use crate::corpus::CorpusSnapshot;
use crate::embedding::EmbeddingError;
use crate::matching::{MatchResult, SimilarityMatcher};

/// Matches query texts against the cached corpus.
pub struct MatchService {
    cache: Arc<CorpusCache>,
    matcher: SimilarityMatcher,
    memo: Option<MatchMemo>,
    memo_generation: AtomicU64,
    embed_timeout: Duration,
}

impl std::fmt::Debug for MatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchService")
            .field("cache", &self.cache)
            .field("matcher", &self.matcher)
            .field("memo", &self.memo)
            .field("embed_timeout", &self.embed_timeout)
            .finish()
    }
}

impl MatchService {
    /// A `memo_capacity` of 0 disables the memo.
    pub fn new(
        cache: Arc<CorpusCache>,
        matcher: SimilarityMatcher,
        memo_capacity: u64,
        embed_timeout: Duration,
    ) -> Self {
        let memo = (memo_capacity > 0).then(|| MatchMemo::with_capacity(memo_capacity));
        Self {
            cache,
            matcher,
            memo,
            memo_generation: AtomicU64::new(0),
            embed_timeout,
        }
    }

    pub fn cache(&self) -> &Arc<CorpusCache> {
        &self.cache
    }

    pub fn memo(&self) -> Option<&MatchMemo> {
        self.memo.as_ref()
    }

    /// Matches `query` against the freshest available corpus.
    ///
    /// Corpus and freshness outages never fail the request; only embedding
    /// the query can.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn match_text(&self, query: &str) -> MatchServiceResult<MatchResult> {
        let outcome = self.cache.refresh_if_stale().await;
        if outcome != RefreshOutcome::UpToDate {
            debug!(?outcome, "Refresh check");
        }

        let snapshot = self.cache.snapshot();
        if snapshot.is_empty() {
            warn!("No corpus loaded, answering no-match");
            return Ok(MatchResult::NoMatch);
        }

        self.sync_memo(&snapshot);
        if let Some(hit) = self
            .memo
            .as_ref()
            .and_then(|memo| memo.get(snapshot.generation(), query))
        {
            debug!(generation = snapshot.generation(), "Match memo hit");
            return Ok(hit);
        }

        let vector = self.embed_query(query).await?;
        if vector.len() != snapshot.dimension() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: snapshot.dimension(),
                actual: vector.len(),
            }
            .into());
        }

        let result = self.matcher.find_match(query, &vector, &snapshot);
        debug!(
            matched = result.is_match(),
            similarity = ?result.similarity(),
            tier = ?result.tier(),
            generation = snapshot.generation(),
            "Match complete"
        );

        if let Some(memo) = &self.memo {
            memo.insert(snapshot.generation(), query, result.clone());
        }
        Ok(result)
    }

    async fn embed_query(&self, query: &str) -> MatchServiceResult<Vec<f32>> {
        let embedder = Arc::clone(self.cache.embedder());
        let text = query.to_string();
        let task = tokio::task::spawn_blocking(move || embedder.embed(&text));

        let joined = tokio::time::timeout(self.embed_timeout, task)
            .await
            .map_err(|_| MatchError::EmbeddingTimeout {
                timeout: self.embed_timeout,
            })?;

        let embedded = joined.map_err(|e| MatchError::TaskFailed {
            reason: e.to_string(),
        })?;
        Ok(embedded?)
    }

    /// Clears the memo the first time a newer snapshot is seen.
    fn sync_memo(&self, snapshot: &CorpusSnapshot) {
        let Some(memo) = &self.memo else { return };
        let generation = snapshot.generation();
        let previous = self.memo_generation.fetch_max(generation, Ordering::SeqCst);
        if previous < generation && previous != 0 {
            debug!(previous, generation, "Snapshot changed, clearing match memo");
            memo.clear();
        }
    }
}
