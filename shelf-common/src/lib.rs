//! # Shelf Common Library
//!
//! Shared code for the Shelf discovery microservices:
//! - Book record model and genre taxonomy
//! - Error taxonomy shared by every service
//! - Configuration loading (CLI → ENV → TOML → defaults)
//! - Cache Store abstraction with in-memory and Redis backends
//! - Rate-limited outbound HTTP fetcher

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod genres;
pub mod models;

pub use cache::CacheStore;
pub use error::{Error, Result};
pub use fetcher::{ByteSource, RateLimitedFetcher};
pub use models::{Book, SearchOrder, SearchQuery};
