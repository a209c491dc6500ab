//! Items Service - item CRUD over SQLite with a read-through cache
//!
//! # Startup Sequence
//! 1. Initialize tracing subscriber for logging
//! 2. Load configuration from environment variables
//! 3. Open the SQLite store
//! 4. Connect the cache backend (falls back to no cache if Redis is down)
//! 5. Serve HTTP until SIGINT/SIGTERM, then release the cache connection

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::{signal, task::JoinHandle};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use items_service::{
    api::create_router,
    cache::{CacheClient, MemoryBackend, RedisBackend},
    config::CacheBackendKind,
    spawn_cleanup_task,
    store::SqliteItemStore,
    AppState, Config, ItemService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "items_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Items Service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: database={}, cache_backend={:?}, cache_ttl={}s, port={}",
        config.database_path(),
        config.cache_backend,
        config.cache_ttl,
        config.server_port
    );

    let store = SqliteItemStore::open(config.database_path())
        .with_context(|| format!("failed to open database at {}", config.database_path()))?;
    info!("Item store initialized");

    let (cache, cleanup_handle) = build_cache(&config).await;
    let service = ItemService::new(Arc::new(store), cache.clone());

    // the store may have changed while we were down
    service.invalidate_all().await;

    let app = create_router(AppState::new(service));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // in-flight requests have drained by now
    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
    cache.shutdown().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the cache client for the configured backend.
async fn build_cache(config: &Config) -> (CacheClient, Option<JoinHandle<()>>) {
    match config.cache_backend {
        CacheBackendKind::Redis => match RedisBackend::connect(&config.redis_url).await {
            Ok(backend) => {
                info!("Redis cache connected");
                (CacheClient::new(Arc::new(backend), config.cache_ttl), None)
            }
            Err(e) => {
                warn!("Redis unavailable ({}), running without cache", e);
                (CacheClient::disabled(), None)
            }
        },
        CacheBackendKind::Memory => {
            let backend = Arc::new(MemoryBackend::new(config.cache_max_entries));
            let handle = spawn_cleanup_task(backend.clone(), config.cleanup_interval);
            info!("In-process cache initialized");
            (CacheClient::new(backend, config.cache_ttl), Some(handle))
        }
        CacheBackendKind::None => {
            info!("Cache disabled");
            (CacheClient::disabled(), None)
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
