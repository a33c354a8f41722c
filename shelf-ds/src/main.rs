//! Discovery service (shelf-ds) - Main entry point
//!
//! Serves recommendations, new releases and last releases per user.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use shelf_common::config::{load_toml_config, resolve_config_path};
use shelf_common::{cache, ByteSource, RateLimitedFetcher};
use shelf_ds::config::DsConfig;
use shelf_ds::sources::{HttpCatalogSource, HttpLibrarySource};
use shelf_ds::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for shelf-ds
#[derive(Parser, Debug)]
#[command(name = "shelf-ds")]
#[command(about = "Discovery microservice for Shelf")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "SHELF_DS_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), "shelf-ds");
    let mut config: DsConfig = load_toml_config(config_path.as_deref())
        .context("Failed to load configuration")?;
    config.apply_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .init();

    info!(
        "Starting Shelf Discovery (shelf-ds) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using defaults"),
    }
    config.validate().context("Invalid configuration")?;

    info!("Library store: {}", config.sources.library_url);
    info!("Metadata service: {}", config.sources.metadata_url);

    let cache = cache::connect(&config.cache)
        .await
        .context("Failed to connect cache backend")?;

    let library_fetcher: Arc<dyn ByteSource> =
        Arc::new(RateLimitedFetcher::new("library", &config.library_fetcher)?);
    let metadata_fetcher: Arc<dyn ByteSource> =
        Arc::new(RateLimitedFetcher::new("metadata", &config.metadata_fetcher)?);

    let state = AppState::new(
        &config,
        Arc::new(HttpLibrarySource::new(
            library_fetcher,
            config.sources.library_url.clone(),
        )),
        Arc::new(HttpCatalogSource::new(
            metadata_fetcher,
            config.sources.metadata_url.clone(),
        )),
        cache,
    );
    let app = build_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("shelf-ds listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
