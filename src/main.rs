//! Refresh Cache - A self-refreshing value cache server
//!
//! Serves values from an upstream HTTP origin through a refreshing cache.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refresh_cache::api::create_router;
use refresh_cache::{AppState, Config, HttpValueFetcher, RefreshingCache};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the upstream fetcher and the refreshing cache (starts the reaper)
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refresh_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Refresh Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: upstream={}, ttl={:?}, force_update={}, clean_interval={:?}, port={}",
        config.upstream_url,
        config.cache.ttl,
        config.cache.force_update,
        config.cache.clean_interval,
        config.server_port
    );

    let client = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .context("failed to build upstream HTTP client")?;
    let mut fetcher = HttpValueFetcher::new(config.upstream_url.clone())
        .with_client(client)
        .with_missing_as_empty(config.missing_as_empty);
    if let Some(default_value) = &config.default_value {
        fetcher = fetcher.with_default_value(default_value.clone());
    }

    let cache = RefreshingCache::new(fetcher, config.cache.clone())
        .context("invalid cache configuration")?;
    let state = AppState::new(cache);
    info!("Refreshing cache initialized, reaper {:?}", state.cache.reaper_state());

    let cache = Arc::clone(&state.cache);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    cache.stop_cleaner();
    info!("Server shutdown complete");
    Ok(())
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
