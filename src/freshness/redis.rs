//! Redis-backed freshness store (`HGET` / `HSET`).

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::debug;

use super::error::FreshnessResult;
use super::store::FreshnessStore;

/// Freshness store over a shared multiplexed Redis connection.
///
/// The connection is opened on first use and dropped after a command error so
/// the next call reconnects.
pub struct RedisFreshnessStore {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl std::fmt::Debug for RedisFreshnessStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisFreshnessStore")
            .field("addr", &self.client.get_connection_info().addr)
            .finish_non_exhaustive()
    }
}

impl RedisFreshnessStore {
    /// Parses `redis_url` (e.g. `redis://127.0.0.1:6379/`) without connecting.
    pub fn new(redis_url: &str) -> FreshnessResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
        })
    }

    async fn connection(&self) -> FreshnessResult<MultiplexedConnection> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        debug!("Opening Redis connection");
        let conn = self.client.get_multiplexed_async_connection().await?;
        *guard = Some(conn.clone());
        Ok(conn)
    }

    async fn reset(&self) {
        *self.connection.lock().await = None;
    }
}

#[async_trait]
impl FreshnessStore for RedisFreshnessStore {
    async fn get(&self, key: &str, field: &str) -> FreshnessResult<Option<String>> {
        let mut conn = self.connection().await?;
        match conn.hget::<_, _, Option<String>>(key, field).await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.reset().await;
                Err(e.into())
            }
        }
    }

    async fn set(&self, key: &str, field: &str, value: &str) -> FreshnessResult<()> {
        let mut conn = self.connection().await?;
        match conn.hset::<_, _, _, ()>(key, field, value).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.reset().await;
                Err(e.into())
            }
        }
    }

    fn describe(&self) -> String {
        format!("redis {}", self.client.get_connection_info().addr)
    }
}
