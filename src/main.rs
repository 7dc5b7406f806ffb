//! PokéView - catalog server over a memoized, persistently cached upstream

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokeview_cache::api::create_router;
use pokeview_cache::catalog::{Catalog, PokeApiSource};
use pokeview_cache::storage::{FileMedium, PersistentStore};
use pokeview_cache::{AppState, Config};

/// Main entry point for the PokéView server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the storage file and upstream client
/// 4. Load or fetch the name database
/// 5. Start HTTP server and handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokeview_cache=info,pokeview=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PokéView server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: storage={}, query_cache={}, entity_cache={}, port={}",
        config.storage_path, config.query_cache_limit, config.entity_cache_limit, config.server_port
    );

    let medium = FileMedium::open(&config.storage_path, Some(config.storage_quota_bytes))
        .with_context(|| format!("Failed to open storage at {}", config.storage_path))?;
    let store = PersistentStore::with_prefix(Arc::new(medium), config.storage_prefix.clone());

    let source = PokeApiSource::new(
        config.api_base_url.clone(),
        Duration::from_millis(config.api_timeout_ms),
    )?;

    let catalog = Catalog::init(&config, store, Arc::new(source)).await?;
    info!("Catalog ready with {} names", catalog.names().len());

    let app = create_router(AppState::new(catalog));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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
