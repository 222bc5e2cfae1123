//! MediaVeil gateway server

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use mediaveil_api::{
    config::LogFormat, routes::create_router, AppState, Config, OriginRegistry, RegistryPolicy,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine; the environment may already be populated
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("Invalid configuration")?;
    init_tracing(config.log_format);

    tracing::info!(?config, "Starting MediaVeil gateway");
    if config.url_encryption_key.is_none() {
        tracing::warn!("URL_ENCRYPTION_KEY not set; registration will fail until it is configured");
    }
    if config.internal_api_key.is_none() {
        tracing::warn!("INTERNAL_API_KEY not set; registration will fail until it is configured");
    }
    if config.registry_max_entries.is_none() && config.registry_ttl.is_none() {
        tracing::info!("Origin registry is unbounded; set REGISTRY_MAX_ENTRIES or REGISTRY_TTL_SECS to cap memory");
    }

    let registry = Arc::new(OriginRegistry::with_policy(RegistryPolicy {
        max_entries: config.registry_max_entries,
        ttl: config.registry_ttl,
    }));
    if config.registry_ttl.is_some() {
        spawn_registry_sweeper(Arc::clone(&registry), config.registry_sweep_interval);
    }

    let bind_address = config.bind_address();
    let state = AppState::with_registry(config, registry).context("Failed to create HTTP client")?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {bind_address}"))?;
    tracing::info!("Proxy service running on {bind_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(env_filter).init(),
    }
}

/// Periodically drop expired registry entries
fn spawn_registry_sweeper(registry: Arc<OriginRegistry>, interval: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let removed = registry.cleanup();
            if removed > 0 {
                tracing::debug!(removed, "Swept expired origins");
            }
        }
    });
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
