//! HTTP clients for the library store and the metadata service

use super::{CatalogSource, LibrarySource};
use async_trait::async_trait;
use shelf_common::fetcher::fetch_json;
use shelf_common::{Book, ByteSource, Error, Result, SearchQuery};
use std::sync::Arc;
use tracing::debug;

/// `base` joined with path segments (each percent-encoded)
fn endpoint(base: &str, segments: &[&str]) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| Error::Config(format!("invalid base URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("base URL {} cannot hold a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Library store over HTTP (`GET /books/:user_id`)
pub struct HttpLibrarySource {
    fetcher: Arc<dyn ByteSource>,
    base_url: String,
}

impl HttpLibrarySource {
    pub fn new(fetcher: Arc<dyn ByteSource>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl LibrarySource for HttpLibrarySource {
    async fn load_library(&self, user_id: &str) -> Result<Vec<Book>> {
        let url = endpoint(&self.base_url, &["books", user_id])?;
        let books: Vec<Book> = fetch_json(self.fetcher.as_ref(), url.as_str()).await?;
        debug!(user_id, books = books.len(), "Library loaded");
        Ok(books)
    }
}

/// Metadata service over HTTP (`GET /search`, `GET /lists/:name`)
pub struct HttpCatalogSource {
    fetcher: Arc<dyn ByteSource>,
    base_url: String,
}

impl HttpCatalogSource {
    pub fn new(fetcher: Arc<dyn ByteSource>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>> {
        let mut url = endpoint(&self.base_url, &["search"])?;
        url.query_pairs_mut()
            .append_pair("q", &query.q)
            .append_pair("maxResults", &query.max_results.to_string())
            .append_pair("orderBy", query.order_by.as_str());

        fetch_json(self.fetcher.as_ref(), url.as_str()).await
    }

    async fn curated_list(&self, list_name: &str) -> Result<Vec<Book>> {
        let url = endpoint(&self.base_url, &["lists", list_name])?;
        fetch_json(self.fetcher.as_ref(), url.as_str()).await
    }
}
