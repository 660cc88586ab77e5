//! In-memory corpus store with outage switches.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use super::entry::CorpusEntry;
use super::error::{CorpusError, CorpusResult};
use super::store::CorpusStore;

#[derive(Debug, Default, Clone)]
pub struct MockCorpusStore {
    rows: Arc<RwLock<Vec<CorpusEntry>>>,
    unavailable: Arc<AtomicBool>,
    delay: Arc<Mutex<Option<Duration>>>,
    fetches: Arc<AtomicUsize>,
}

impl MockCorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<CorpusEntry>) -> Self {
        let store = Self::new();
        store.set_rows(rows);
        store
    }

    /// Replaces the whole table, like an ingestion run would.
    pub fn set_rows(&self, rows: Vec<CorpusEntry>) {
        *self.rows.write() = rows;
    }

    pub fn push(&self, entry: CorpusEntry) {
        self.rows.write().push(entry);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes every fetch sleep first (for timeout tests).
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CorpusStore for MockCorpusStore {
    async fn fetch_all(&self) -> CorpusResult<Vec<CorpusEntry>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CorpusError::Unavailable {
                reason: "mock store offline".to_string(),
            });
        }

        Ok(self.rows.read().clone())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
