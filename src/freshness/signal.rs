use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use super::error::{FreshnessError, FreshnessResult};
use super::store::FreshnessStore;
use super::timestamp::UpdateTimestamp;
use crate::constants::FRESHNESS_LOGICAL_NAME;
use crate::hashing::freshness_key;

/// The update-signal protocol shared with the ingestion process.
///
/// The signal lives in one hash keyed by `sha256_hex("intelligence_list")`.
/// Readers watch the `intelligence_list` field; writers may publish any field.
#[derive(Clone)]
pub struct FreshnessSignal {
    store: Arc<dyn FreshnessStore>,
    key: String,
    timeout: Duration,
}

impl std::fmt::Debug for FreshnessSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessSignal")
            .field("store", &self.store.describe())
            .field("key", &self.key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl FreshnessSignal {
    pub fn new(store: Arc<dyn FreshnessStore>, timeout: Duration) -> Self {
        Self {
            store,
            key: freshness_key(FRESHNESS_LOGICAL_NAME),
            timeout,
        }
    }

    /// Hash key the signal is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the latest published update time; `None` if nothing was published.
    #[instrument(skip(self), level = "debug")]
    pub async fn current(&self) -> FreshnessResult<Option<UpdateTimestamp>> {
        let raw = tokio::time::timeout(
            self.timeout,
            self.store.get(&self.key, FRESHNESS_LOGICAL_NAME),
        )
        .await
        .map_err(|_| FreshnessError::Timeout {
            timeout: self.timeout,
        })??;

        match raw {
            Some(raw) => {
                let ts = UpdateTimestamp::parse(&raw)?;
                debug!(update_time = %ts, "Read freshness signal");
                Ok(Some(ts))
            }
            None => Ok(None),
        }
    }

    /// Publishes `ts` under `field`.
    #[instrument(skip(self, ts), fields(ts = %ts))]
    pub async fn publish(&self, field: &str, ts: UpdateTimestamp) -> FreshnessResult<()> {
        tokio::time::timeout(
            self.timeout,
            self.store.set(&self.key, field, &ts.format()),
        )
        .await
        .map_err(|_| FreshnessError::Timeout {
            timeout: self.timeout,
        })?
    }
}
