//! Factmatch HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use factmatch::cache::CorpusCache;
use factmatch::config::{Config, health_check_url, load_env_file};
use factmatch::constants::FRESHNESS_LOGICAL_NAME;
use factmatch::corpus::MySqlCorpusStore;
use factmatch::embedding::load_embedder;
use factmatch::freshness::{FreshnessSignal, RedisFreshnessStore, UpdateTimestamp};
use factmatch::gateway::{HandlerState, create_router_with_state};
use factmatch::matching::SimilarityMatcher;
use factmatch::service::MatchService;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let env_file = load_env_file();

    if args.iter().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Some(path) = &env_file {
        tracing::info!(path = %path.display(), "Loaded env file");
    }

    let config = Config::from_env()?;
    config.validate()?;

    if let Some(pos) = args.iter().position(|arg| arg == "--mark-updated") {
        let field = args
            .get(pos + 1)
            .filter(|f| !f.starts_with("--"))
            .map(String::as_str)
            .unwrap_or(FRESHNESS_LOGICAL_NAME);
        return mark_updated(&config, field).await;
    }

    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        tables = ?config.corpus_tables,
        "Factmatch starting"
    );

    let embedder_config = config.embedder_config();
    let embedder = tokio::task::spawn_blocking(move || load_embedder(embedder_config)).await??;
    tracing::info!(
        mode = embedder.mode(),
        dimension = embedder.dimension(),
        "Embedder ready"
    );

    let corpus_store = MySqlCorpusStore::connect_lazy(
        &config.database_url,
        &config.corpus_tables,
        config.db_max_connections,
        config.store_timeout,
    )?;
    let freshness_store = RedisFreshnessStore::new(&config.redis_url)?;
    let signal = FreshnessSignal::new(Arc::new(freshness_store), config.store_timeout);

    let cache = Arc::new(CorpusCache::new(
        Arc::new(corpus_store),
        signal,
        embedder,
        config.cache_config(),
    ));

    tracing::info!("Loading corpus...");
    if let Err(e) = cache.load().await {
        tracing::warn!(
            error = %e,
            "Initial corpus load failed. Serving no-match until a reload succeeds."
        );
    }

    let service = Arc::new(MatchService::new(
        cache,
        SimilarityMatcher::new(config.matcher_config()),
        config.memo_capacity,
        config.embed_timeout,
    ));

    let app = create_router_with_state(HandlerState::new(service));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Factmatch shutdown complete");
    Ok(())
}

/// Publishes the current minute under `field`, as the ingestion side does after an update.
async fn mark_updated(config: &Config, field: &str) -> anyhow::Result<()> {
    let store = RedisFreshnessStore::new(&config.redis_url)?;
    let signal = FreshnessSignal::new(Arc::new(store), config.store_timeout);
    let now = UpdateTimestamp::now();

    signal.publish(field, now).await?;
    tracing::info!(field, ts = %now, key = signal.key(), "Published corpus update time");
    Ok(())
}

fn run_health_check() -> i32 {
    let url = health_check_url();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(_) => return 1,
    };

    rt.block_on(async {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        {
            Ok(client) => client,
            Err(_) => return 1,
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
