use async_trait::async_trait;

use super::error::FreshnessResult;

/// Hash-field access to the shared key-value store.
#[async_trait]
pub trait FreshnessStore: Send + Sync {
    /// Reads `field` of the hash at `key`; `None` when either is missing.
    async fn get(&self, key: &str, field: &str) -> FreshnessResult<Option<String>>;

    /// Writes `field` of the hash at `key`.
    async fn set(&self, key: &str, field: &str, value: &str) -> FreshnessResult<()>;

    /// Short description for logs.
    fn describe(&self) -> String;
}
