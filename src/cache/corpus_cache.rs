//! The corpus cache: current snapshot plus the refresh protocol.
//!
//! Readers call [`CorpusCache::snapshot`] once per request and keep the
//! returned `Arc` for the whole scan. A reload builds a complete new snapshot
//! off to the side and installs it with a single pointer swap.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use super::error::{CacheError, CacheResult};
use crate::constants::{DEFAULT_RELOAD_BACKOFF_SECS, DEFAULT_STORE_TIMEOUT_MS};
use crate::corpus::{CorpusError, CorpusSnapshot, CorpusStore};
use crate::embedding::{Embedder, EmbeddingError};
use crate::freshness::{FreshnessSignal, UpdateTimestamp};
use crate::hashing::short_hex;

/// Timing knobs for the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Upper bound on one corpus query.
    pub store_timeout: Duration,
    /// Minimum delay between a failed load and the next attempt.
    pub reload_backoff: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            reload_backoff: Duration::from_secs(DEFAULT_RELOAD_BACKOFF_SECS),
        }
    }
}

/// What [`CorpusCache::refresh_if_stale`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The loaded corpus is at least as new as the published signal.
    UpToDate,
    /// A new snapshot was installed.
    Reloaded { generation: u64, entries: usize },
    /// A reload was attempted and failed; the previous snapshot stays.
    ReloadFailed,
    /// A reload is due but a recent failure is still backing off.
    Deferred,
    /// The freshness store could not be read; the current snapshot is served.
    FreshnessUnavailable,
}

/// `true` when `latest` was published after the snapshot was loaded.
///
/// Nothing published means nothing to catch up on. A snapshot loaded without
/// a known timestamp is stale as soon as one appears.
pub fn is_stale(loaded_at: Option<UpdateTimestamp>, latest: Option<UpdateTimestamp>) -> bool {
    match (loaded_at, latest) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(loaded), Some(latest)) => latest > loaded,
    }
}

/// A failed load and the published timestamp it was trying to catch up to.
#[derive(Debug, Clone, Copy)]
struct FailedLoad {
    at: Instant,
    target: Option<UpdateTimestamp>,
}

/// Owns the current [`CorpusSnapshot`] and decides when to replace it.
pub struct CorpusCache {
    store: Arc<dyn CorpusStore>,
    signal: FreshnessSignal,
    embedder: Arc<dyn Embedder>,
    config: CacheConfig,
    current: ArcSwap<CorpusSnapshot>,
    reload_guard: tokio::sync::Mutex<()>,
    last_failure: Mutex<Option<FailedLoad>>,
    generation: AtomicU64,
}

impl std::fmt::Debug for CorpusCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.current.load();
        f.debug_struct("CorpusCache")
            .field("store", &self.store.describe())
            .field("embedder", &self.embedder.mode())
            .field("entries", &snapshot.len())
            .field("generation", &snapshot.generation())
            .field("config", &self.config)
            .finish()
    }
}

impl CorpusCache {
    /// Creates a cache holding the empty snapshot. Call [`load`](Self::load) to fill it.
    pub fn new(
        store: Arc<dyn CorpusStore>,
        signal: FreshnessSignal,
        embedder: Arc<dyn Embedder>,
        config: CacheConfig,
    ) -> Self {
        Self {
            store,
            signal,
            embedder,
            config,
            current: ArcSwap::from_pointee(CorpusSnapshot::empty()),
            reload_guard: tokio::sync::Mutex::new(()),
            last_failure: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the current snapshot. Hold on to it for the whole request.
    #[inline]
    pub fn snapshot(&self) -> Arc<CorpusSnapshot> {
        self.current.load_full()
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Loads the full corpus and installs it, ignoring any backoff.
    ///
    /// On failure the previous snapshot stays in place and the error is returned
    /// for the caller to log.
    #[instrument(skip(self), fields(store = %self.store.describe()))]
    pub async fn load(&self) -> CacheResult<Arc<CorpusSnapshot>> {
        let _guard = self.reload_guard.lock().await;
        self.load_locked(None).await
    }

    /// Reloads when the freshness signal is newer than the loaded snapshot.
    ///
    /// The common case costs one freshness read. Never fails: store outages
    /// are logged and reported through the outcome.
    #[instrument(skip(self), level = "debug")]
    pub async fn refresh_if_stale(&self) -> RefreshOutcome {
        let current = self.current.load_full();

        if !current.is_loaded() {
            return self.retry_initial_load().await;
        }

        let latest = match self.signal.current().await {
            Ok(latest) => latest,
            Err(e) => {
                warn!(error = %e, "Freshness check failed, serving current corpus");
                return RefreshOutcome::FreshnessUnavailable;
            }
        };

        if !is_stale(current.loaded_at(), latest) {
            return RefreshOutcome::UpToDate;
        }
        if self.in_backoff(latest) {
            return RefreshOutcome::Deferred;
        }

        let _guard = self.reload_guard.lock().await;

        // Another request may have reloaded (or failed) while we waited.
        if !is_stale(self.current.load().loaded_at(), latest) {
            return RefreshOutcome::UpToDate;
        }
        if self.in_backoff(latest) {
            return RefreshOutcome::Deferred;
        }

        info!(
            loaded_at = ?current.loaded_at().map(|ts| ts.format()),
            latest = ?latest.map(|ts| ts.format()),
            "Corpus is stale, reloading"
        );
        self.reload_outcome(latest).await
    }

    async fn retry_initial_load(&self) -> RefreshOutcome {
        if self.in_backoff(None) {
            return RefreshOutcome::Deferred;
        }

        let _guard = self.reload_guard.lock().await;
        if self.current.load().is_loaded() {
            return RefreshOutcome::UpToDate;
        }
        if self.in_backoff(None) {
            return RefreshOutcome::Deferred;
        }

        info!("No corpus loaded yet, retrying initial load");
        self.reload_outcome(None).await
    }

    async fn reload_outcome(&self, target: Option<UpdateTimestamp>) -> RefreshOutcome {
        match self.load_locked(target).await {
            Ok(snapshot) => RefreshOutcome::Reloaded {
                generation: snapshot.generation(),
                entries: snapshot.len(),
            },
            Err(_) => RefreshOutcome::ReloadFailed,
        }
    }

    /// `true` while a recent failure covers `latest`. A timestamp newer than
    /// the one the failed load targeted is not held back.
    fn in_backoff(&self, latest: Option<UpdateTimestamp>) -> bool {
        self.last_failure.lock().is_some_and(|failed| {
            failed.at.elapsed() < self.config.reload_backoff && latest <= failed.target
        })
    }

    /// Caller must hold `reload_guard`. `target` is the published timestamp
    /// this load is catching up to, if known.
    async fn load_locked(
        &self,
        target: Option<UpdateTimestamp>,
    ) -> CacheResult<Arc<CorpusSnapshot>> {
        let started = Instant::now();

        match self.build_snapshot().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.current.store(Arc::clone(&snapshot));
                *self.last_failure.lock() = None;

                info!(
                    entries = snapshot.len(),
                    generation = snapshot.generation(),
                    loaded_at = ?snapshot.loaded_at().map(|ts| ts.format()),
                    fingerprint = %short_hex(snapshot.fingerprint()),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Corpus snapshot installed"
                );
                Ok(snapshot)
            }
            Err(e) => {
                *self.last_failure.lock() = Some(FailedLoad {
                    at: Instant::now(),
                    target,
                });
                let previous = self.current.load();
                warn!(
                    error = %e,
                    kept_entries = previous.len(),
                    kept_generation = previous.generation(),
                    "Corpus load failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    async fn build_snapshot(&self) -> CacheResult<CorpusSnapshot> {
        // Read the signal first: an update published mid-load must still look
        // newer than what we record here.
        let loaded_at = match self.signal.current().await {
            Ok(ts) => ts,
            Err(e) => {
                warn!(error = %e, "Freshness store unavailable during load, recording no timestamp");
                None
            }
        };

        let timeout = self.config.store_timeout;
        let entries = tokio::time::timeout(timeout, self.store.fetch_all())
            .await
            .map_err(|_| CorpusError::Timeout { timeout })??;

        if entries.is_empty() {
            return Err(CorpusError::Empty.into());
        }
        debug!(rows = entries.len(), "Embedding corpus rows");

        let embedder = Arc::clone(&self.embedder);
        let (entries, vectors) = tokio::task::spawn_blocking(move || {
            let texts: Vec<String> = entries.iter().map(|e| e.embedding_text()).collect();
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            embedder.embed_batch(&refs).map(|vectors| (entries, vectors))
        })
        .await
        .map_err(|e| CacheError::TaskFailed {
            reason: e.to_string(),
        })??;

        let expected = self.embedder.dimension();
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: bad.len(),
            }
            .into());
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CorpusSnapshot::build(entries, vectors, loaded_at, generation)?)
    }
}
