//! shelf-md library - Book Metadata service
//!
//! Normalizes the search catalog and curated lists into Book records and
//! proxies cover thumbnails through the image cache.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod image_cache;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use catalog::{GoogleBooksClient, NytListsClient};
use chrono::{DateTime, Utc};
use image_cache::ImageCache;
use shelf_common::CacheStore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<GoogleBooksClient>,
    pub lists: Arc<NytListsClient>,
    pub images: Arc<ImageCache>,
    /// Reported by the health endpoint
    pub cache: Arc<dyn CacheStore>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        books: GoogleBooksClient,
        lists: NytListsClient,
        images: ImageCache,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            books: Arc::new(books),
            lists: Arc::new(lists),
            images: Arc::new(images),
            cache,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::catalog_routes())
        .merge(api::image_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
