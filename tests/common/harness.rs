//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use factmatch::cache::{CacheConfig, CorpusCache};
use factmatch::constants::FRESHNESS_LOGICAL_NAME;
use factmatch::gateway::{HandlerState, create_router_with_state};
use factmatch::{
    CorpusEntry, FreshnessSignal, LookupEmbedder, MatchService, MatcherConfig, MockCorpusStore,
    MockFreshnessStore, SimilarityMatcher, UpdateTimestamp,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::fixtures::DIM;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub rows: Vec<(CorpusEntry, Vec<f32>)>,
    pub memo_capacity: u64,
    /// Load the corpus before serving.
    pub preload: bool,
    pub reload_backoff: Duration,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            rows: super::fixtures::rumor_rows(),
            memo_capacity: 0,
            preload: true,
            reload_backoff: Duration::from_millis(50),
        }
    }
}

/// A running server plus handles on every mocked collaborator.
pub struct TestServer {
    pub addr: SocketAddr,
    pub corpus: MockCorpusStore,
    pub freshness: MockFreshnessStore,
    pub signal: FreshnessSignal,
    pub embedder: LookupEmbedder,
    pub service: Arc<MatchService>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Registers the vector a query text embeds to.
    pub fn register_query(&self, text: &str, vector: Vec<f32>) {
        self.embedder.insert(text, vector);
    }

    /// Replaces the stored corpus (vectors are registered with the embedder).
    pub fn replace_corpus(&self, rows: Vec<(CorpusEntry, Vec<f32>)>) {
        for (entry, vector) in &rows {
            self.embedder.insert(&entry.embedding_text(), vector.clone());
        }
        self.corpus
            .set_rows(rows.into_iter().map(|(entry, _)| entry).collect());
    }

    /// Publishes an update time, as the ingestion job does.
    pub async fn publish_update(&self, raw: &str) {
        let ts = UpdateTimestamp::parse(raw).expect("fixture timestamp should parse");
        self.signal
            .publish(FRESHNESS_LOGICAL_NAME, ts)
            .await
            .expect("mock publish should succeed");
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server whose corpus store, freshness store, and embedder are all
/// in-memory mocks. Query vectors come from [`TestServer::register_query`].
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let embedder = LookupEmbedder::new(DIM);
    for (entry, vector) in &config.rows {
        embedder.insert(&entry.embedding_text(), vector.clone());
    }

    let corpus = MockCorpusStore::with_rows(config.rows.into_iter().map(|(e, _)| e).collect());
    let freshness = MockFreshnessStore::new();
    let signal = FreshnessSignal::new(Arc::new(freshness.clone()), Duration::from_millis(200));

    let cache = Arc::new(CorpusCache::new(
        Arc::new(corpus.clone()),
        signal.clone(),
        Arc::new(embedder.clone()),
        CacheConfig {
            store_timeout: Duration::from_millis(500),
            reload_backoff: config.reload_backoff,
        },
    ));

    if config.preload {
        cache
            .load()
            .await
            .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    }

    let service = Arc::new(MatchService::new(
        cache,
        SimilarityMatcher::new(MatcherConfig::default()),
        config.memo_capacity,
        Duration::from_millis(500),
    ));

    let app = create_router_with_state(HandlerState::new(Arc::clone(&service)));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        corpus,
        freshness,
        signal,
        embedder,
        service,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
