//! In-memory freshness store with outage switches.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use super::error::{FreshnessError, FreshnessResult};
use super::store::FreshnessStore;

#[derive(Debug, Default, Clone)]
pub struct MockFreshnessStore {
    hashes: Arc<RwLock<HashMap<String, HashMap<String, String>>>>,
    unavailable: Arc<AtomicBool>,
    delay: Arc<Mutex<Option<Duration>>>,
    reads: Arc<AtomicUsize>,
}

impl MockFreshnessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw value, bypassing the outage switch.
    pub fn put(&self, key: &str, field: &str, value: &str) {
        self.hashes
            .write()
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    pub fn remove(&self, key: &str, field: &str) {
        if let Some(hash) = self.hashes.write().get_mut(key) {
            hash.remove(field);
        }
    }

    pub fn peek(&self, key: &str, field: &str) -> Option<String> {
        self.hashes
            .read()
            .get(key)
            .and_then(|hash| hash.get(field).cloned())
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    async fn gate(&self) -> FreshnessResult<()> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(FreshnessError::Unavailable {
                reason: "mock store offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FreshnessStore for MockFreshnessStore {
    async fn get(&self, key: &str, field: &str) -> FreshnessResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        Ok(self.peek(key, field))
    }

    async fn set(&self, key: &str, field: &str, value: &str) -> FreshnessResult<()> {
        self.gate().await?;
        self.put(key, field, value);
        Ok(())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
