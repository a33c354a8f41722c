//! Collaborators the discovery flows read from
//!
//! Both sit behind traits so flows can run against in-process fakes.

mod http;

pub use http::{HttpCatalogSource, HttpLibrarySource};

use async_trait::async_trait;
use shelf_common::{Book, Result, SearchQuery};

/// A user's owned books
#[async_trait]
pub trait LibrarySource: Send + Sync {
    /// Current library snapshot, in the store's order
    async fn load_library(&self, user_id: &str) -> Result<Vec<Book>>;
}

/// Normalized catalog search and curated lists
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>>;

    async fn curated_list(&self, list_name: &str) -> Result<Vec<Book>>;
}
