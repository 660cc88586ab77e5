use async_trait::async_trait;

use super::entry::CorpusEntry;
use super::error::CorpusResult;

/// Bulk read access to the fact-checked corpus.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Returns every row of the configured source tables, in store order.
    async fn fetch_all(&self) -> CorpusResult<Vec<CorpusEntry>>;

    /// Short description for logs (backend and source tables).
    fn describe(&self) -> String;
}
