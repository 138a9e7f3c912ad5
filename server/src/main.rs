//! eurofx Server Binary
//!
//! Serves EUR reference rates by date from an in-memory cache that is
//! refreshed from the historical feed in the background.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eurofx_rates::{HttpFeedSource, RateStore, RefreshPipeline, RefreshScheduler};
use eurofx_server::{app_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting eurofx server");

    // Load configuration
    let config = ServerConfig::from_env();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }
    let allow_set = config.allow_set()?;

    info!(
        feed_url = %config.feed_url,
        refresh_interval_secs = config.refresh_interval.as_secs(),
        currencies = allow_set.len(),
        "Configuration loaded"
    );

    let store = Arc::new(RateStore::new());
    let source = Arc::new(HttpFeedSource::new(
        config.feed_url.clone(),
        config.fetch_timeout,
    )?);
    let pipeline = RefreshPipeline::new(source, store.clone(), allow_set);

    // First refresh starts now and runs alongside the listener
    let scheduler = Arc::new(RefreshScheduler::new(pipeline, config.refresh_interval));
    let scheduler_handle = scheduler.spawn();

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %config.listen_addr, "Listening");

    axum::serve(listener, app_router(AppState::new(store)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler_handle.shutdown().await;
    info!("eurofx server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
