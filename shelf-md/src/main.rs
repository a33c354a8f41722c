//! Book Metadata service (shelf-md) - Main entry point
//!
//! Serves normalized catalog search, ISBN lookup, curated lists and the
//! cover thumbnail proxy.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use shelf_common::config::{load_toml_config, resolve_config_path};
use shelf_common::{cache, ByteSource, RateLimitedFetcher};
use shelf_md::catalog::{GoogleBooksClient, NytListsClient};
use shelf_md::config::MdConfig;
use shelf_md::image_cache::ImageCache;
use shelf_md::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for shelf-md
#[derive(Parser, Debug)]
#[command(name = "shelf-md")]
#[command(about = "Book metadata microservice for Shelf")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "SHELF_MD_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), "shelf-md");
    let mut config: MdConfig = load_toml_config(config_path.as_deref())
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
        "Starting Shelf Metadata (shelf-md) v{} [{}] built {} ({})",
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

    let cache = cache::connect(&config.cache)
        .await
        .context("Failed to connect cache backend")?;

    let books_fetcher: Arc<dyn ByteSource> =
        Arc::new(RateLimitedFetcher::new("google-books", &config.books_fetcher)?);
    let lists_fetcher: Arc<dyn ByteSource> =
        Arc::new(RateLimitedFetcher::new("nyt-lists", &config.lists_fetcher)?);
    let image_fetcher: Arc<dyn ByteSource> =
        Arc::new(RateLimitedFetcher::new("cover-images", &config.image_fetcher)?);

    if config.catalog.books_api_key.is_none() {
        info!("No books API key configured, using anonymous quota");
    }
    if config.catalog.lists_api_key.is_none() {
        info!("No lists API key configured, curated list calls will likely be rejected");
    }

    let state = AppState::new(
        GoogleBooksClient::new(
            books_fetcher,
            config.catalog.books_api_url.clone(),
            config.catalog.books_api_key.clone(),
        ),
        NytListsClient::new(
            lists_fetcher,
            config.catalog.lists_api_url.clone(),
            config.catalog.lists_api_key.clone(),
        ),
        ImageCache::new(cache.clone(), image_fetcher, config.cache.image_ttl()),
        cache,
    );
    let app = build_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("shelf-md listening on http://{}", addr);
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
