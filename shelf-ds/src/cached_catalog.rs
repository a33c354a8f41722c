//! Long-tier cached catalog lookups
//!
//! Genre, author and curated-list results are keyed by the entity, not the
//! user, so one fetch serves every user interested in that entity until the
//! long TTL runs out. Failed fetches are never cached.

use crate::sources::CatalogSource;
use shelf_common::cache::{get_json, keys, set_json};
use shelf_common::{genres, Book, CacheStore, Result, SearchOrder, SearchQuery};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Search query for a genre label
///
/// Known labels use their taxonomy subject tag; anything else is queried
/// as a subject verbatim.
pub fn genre_query(genre: &str) -> String {
    match genres::by_label(genre) {
        Some(entry) => entry.subject_query(),
        None => format!("{}{}", genres::SUBJECT_PREFIX, genre),
    }
}

/// Search query for an author's works
pub fn author_query(author: &str) -> String {
    format!("inauthor:\"{}\"", author.replace('"', ""))
}

pub struct CachedCatalog {
    catalog: Arc<dyn CatalogSource>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
    page_size: u32,
}

impl CachedCatalog {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        cache: Arc<dyn CacheStore>,
        ttl: Duration,
        page_size: u32,
    ) -> Self {
        Self {
            catalog,
            cache,
            ttl,
            page_size,
        }
    }

    async fn cached<F, Fut>(&self, key: String, fetch: F) -> Result<Vec<Book>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Book>>>,
    {
        if let Some(books) = get_json::<Vec<Book>>(self.cache.as_ref(), &key).await {
            return Ok(books);
        }

        let books = fetch().await?;
        debug!(key = %key, books = books.len(), "Caching catalog lookup");
        set_json(self.cache.as_ref(), &key, &books, self.ttl).await;
        Ok(books)
    }

    /// Catalog entries for a genre label
    pub async fn genre_books(&self, genre: &str) -> Result<Vec<Book>> {
        let query = SearchQuery::new(genre_query(genre), self.page_size, SearchOrder::Relevance)?;
        self.cached(keys::genre_books(genre), || self.catalog.search(&query))
            .await
    }

    /// An author's catalog entries, newest first
    pub async fn author_releases(&self, author: &str) -> Result<Vec<Book>> {
        let query = SearchQuery::new(author_query(author), self.page_size, SearchOrder::Newest)?;
        self.cached(keys::author_releases(author), || self.catalog.search(&query))
            .await
    }

    /// Current entries of a curated list
    pub async fn curated_list(&self, list_name: &str) -> Result<Vec<Book>> {
        self.cached(keys::curated_list(list_name), || {
            self.catalog.curated_list(list_name)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shelf_common::cache::MemoryCache;
    use shelf_common::Error;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedCatalog {
        queries: Mutex<Vec<SearchQuery>>,
        lists: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl CatalogSource for ScriptedCatalog {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>> {
            self.queries.lock().unwrap().push(query.clone());
            if self.fail {
                return Err(Error::upstream("catalog", "down"));
            }
            Ok(vec![Book::titled(query.q.clone())])
        }

        async fn curated_list(&self, list_name: &str) -> Result<Vec<Book>> {
            self.lists.lock().unwrap().push(list_name.to_string());
            Ok(vec![Book::titled(list_name)])
        }
    }

    fn setup(fail: bool) -> (CachedCatalog, Arc<ScriptedCatalog>) {
        let source = Arc::new(ScriptedCatalog {
            fail,
            ..Default::default()
        });
        let cached = CachedCatalog::new(
            source.clone(),
            Arc::new(MemoryCache::new()),
            Duration::from_secs(60),
            20,
        );
        (cached, source)
    }

    #[test]
    fn test_queries() {
        assert_eq!(genre_query("Sci-Fi"), genres::by_label("Sci-Fi").unwrap().subject_query());
        assert_eq!(genre_query("Cozy Mystery"), "subject:Cozy Mystery");
        assert_eq!(author_query("N. K. Jemisin"), "inauthor:\"N. K. Jemisin\"");
    }

    #[tokio::test]
    async fn test_author_lookup_is_shared_across_spellings() {
        let (cached, source) = setup(false);

        cached.author_releases("Ann Leckie").await.unwrap();
        cached.author_releases("ann leckie ").await.unwrap();

        let queries = source.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].order_by, SearchOrder::Newest);
        assert_eq!(queries[0].max_results, 20);
    }

    #[tokio::test]
    async fn test_genre_and_list_lookups_cached() {
        let (cached, source) = setup(false);

        cached.genre_books("Horror").await.unwrap();
        cached.genre_books("Horror").await.unwrap();
        cached.curated_list("hardcover-fiction").await.unwrap();
        cached.curated_list("hardcover-fiction").await.unwrap();

        assert_eq!(source.queries.lock().unwrap().len(), 1);
        assert_eq!(source.lists.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failures_not_cached() {
        let (cached, source) = setup(true);

        assert!(cached.genre_books("Horror").await.is_err());
        assert!(cached.genre_books("Horror").await.is_err());
        assert_eq!(source.queries.lock().unwrap().len(), 2);
    }
}
