//! shelf-ds library - Discovery service
//!
//! Genre-driven recommendations and release tracking for the authors a user
//! reads, built from the user's library snapshot and the metadata service.

pub mod aggregator;
pub mod api;
pub mod cached_catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod freshness;
pub mod ranker;
pub mod releases;
pub mod sources;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use cached_catalog::CachedCatalog;
use chrono::{DateTime, Utc};
use config::DsConfig;
use discovery::Recommender;
use releases::ReleaseTracker;
use shelf_common::CacheStore;
use sources::{CatalogSource, LibrarySource};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub releases: Arc<ReleaseTracker>,
    pub cache: Arc<dyn CacheStore>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire both flows over shared sources and one cache
    pub fn new(
        config: &DsConfig,
        library: Arc<dyn LibrarySource>,
        catalog: Arc<dyn CatalogSource>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        let cached_catalog = Arc::new(CachedCatalog::new(
            catalog,
            cache.clone(),
            config.cache.long_ttl(),
            config.discovery.page_size,
        ));

        let recommender = Recommender::new(
            library.clone(),
            cached_catalog.clone(),
            cache.clone(),
            config.cache.short_ttl(),
            config.discovery.clone(),
        );
        let releases = ReleaseTracker::new(
            library,
            cached_catalog,
            cache.clone(),
            config.cache.short_ttl(),
            config.discovery.clone(),
        );

        Self {
            recommender: Arc::new(recommender),
            releases: Arc::new(releases),
            cache,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::discovery_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
