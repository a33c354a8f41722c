//! Search catalog adapter (Google Books volumes API)

use super::{non_blank, secure_url, year_from_date};
use serde::Deserialize;
use shelf_common::fetcher::fetch_json;
use shelf_common::models::UNKNOWN_AUTHOR;
use shelf_common::{genres, Book, ByteSource, Error, Result, SearchOrder, SearchQuery};
use std::sync::Arc;
use tracing::debug;

/// Volumes search response
#[derive(Debug, Default, Deserialize)]
pub struct VolumesResponse {
    /// Absent when the search matched nothing
    #[serde(default)]
    pub items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub industry_identifiers: Vec<IndustryIdentifier>,
    pub image_links: Option<ImageLinks>,
    pub categories: Vec<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
}

/// ISBN-13 if present, else ISBN-10
fn preferred_isbn(identifiers: &[IndustryIdentifier]) -> Option<String> {
    let find = |kind: &str| {
        identifiers
            .iter()
            .find(|id| id.kind == kind && !id.identifier.trim().is_empty())
            .map(|id| id.identifier.trim().to_string())
    };
    find("ISBN_13").or_else(|| find("ISBN_10"))
}

/// Normalize one volume into a [`Book`]
pub fn normalize_volume(volume: Volume) -> Book {
    let info = volume.volume_info;

    let authors: Vec<&str> = info
        .authors
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect();
    let author = if authors.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        authors.join(", ")
    };

    let mut book = match non_blank(info.title) {
        Some(title) => Book::titled(title),
        None => Book::titled(shelf_common::models::UNKNOWN_TITLE),
    };
    book.catalog_id = preferred_isbn(&info.industry_identifiers);
    book.author = Some(author);
    book.thumbnail_url = info
        .image_links
        .and_then(|links| non_blank(links.thumbnail))
        .map(|url| secure_url(&url));
    book.genre_label = genres::resolve_label(&info.categories);
    book.year = info.published_date.as_deref().and_then(year_from_date);
    book.description = info.description.unwrap_or_default();
    book
}

/// Client for the volumes search catalog
pub struct GoogleBooksClient {
    source: Arc<dyn ByteSource>,
    api_url: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    pub fn new(source: Arc<dyn ByteSource>, api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            source,
            api_url: api_url.into(),
            api_key,
        }
    }

    fn search_url(&self, query: &SearchQuery) -> Result<String> {
        let max_results = query.max_results.to_string();
        let mut params = vec![
            ("q", query.q.as_str()),
            ("maxResults", max_results.as_str()),
            ("orderBy", query.order_by.as_str()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.as_str()));
        }

        reqwest::Url::parse_with_params(&self.api_url, &params)
            .map(String::from)
            .map_err(|e| Error::Config(format!("invalid books API URL {}: {}", self.api_url, e)))
    }

    /// Run a search and normalize every hit
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>> {
        let url = self.search_url(query)?;
        let response: VolumesResponse = fetch_json(self.source.as_ref(), &url).await?;

        debug!(
            source = self.source.source_name(),
            q = %query.q,
            hits = response.items.len(),
            "Volume search complete"
        );

        Ok(response.items.into_iter().map(normalize_volume).collect())
    }

    /// First catalog hit for an ISBN, if any
    pub async fn lookup_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let isbn = isbn.trim();
        if isbn.is_empty() {
            return Err(Error::Validation("isbn must not be empty".to_string()));
        }

        let query = SearchQuery::new(format!("isbn:{}", isbn), 1, SearchOrder::Relevance)?;
        Ok(self.search(&query).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct Canned {
        body: serde_json::Value,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ByteSource for Canned {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(serde_json::to_vec(&self.body).unwrap())
        }

        fn source_name(&self) -> &str {
            "canned"
        }
    }

    fn client(body: serde_json::Value, key: Option<&str>) -> (GoogleBooksClient, Arc<Canned>) {
        let source = Arc::new(Canned {
            body,
            urls: Mutex::new(Vec::new()),
        });
        let client = GoogleBooksClient::new(
            source.clone(),
            "https://books.example/volumes",
            key.map(String::from),
        );
        (client, source)
    }

    fn volume(info: serde_json::Value) -> Volume {
        serde_json::from_value(json!({ "volumeInfo": info })).unwrap()
    }

    #[test]
    fn test_normalize_full_volume() {
        let book = normalize_volume(volume(json!({
            "title": "The Dispossessed",
            "authors": ["Ursula K. Le Guin"],
            "industryIdentifiers": [
                { "type": "ISBN_10", "identifier": "0061054887" },
                { "type": "ISBN_13", "identifier": "9780061054884" }
            ],
            "imageLinks": { "thumbnail": "http://books.example/t.jpg" },
            "categories": ["Fiction / Science Fiction / General"],
            "publishedDate": "1994-10-20",
            "description": "An ambiguous utopia."
        })));

        assert_eq!(book.catalog_id.as_deref(), Some("9780061054884"));
        assert_eq!(book.author.as_deref(), Some("Ursula K. Le Guin"));
        assert_eq!(book.thumbnail_url.as_deref(), Some("https://books.example/t.jpg"));
        assert_eq!(book.year.as_deref(), Some("1994"));
        // No taxonomy tag matches the whole category path, so it passes through
        assert_eq!(
            book.genre_label.as_deref(),
            Some("Fiction / Science Fiction / General")
        );
        assert_eq!(book.description, "An ambiguous utopia.");
    }

    #[test]
    fn test_normalize_sparse_volume() {
        let book = normalize_volume(volume(json!({
            "industryIdentifiers": [{ "type": "ISBN_10", "identifier": "0061054887" }],
            "publishedDate": "circa 1990"
        })));

        assert_eq!(book.title, shelf_common::models::UNKNOWN_TITLE);
        assert_eq!(book.author.as_deref(), Some(UNKNOWN_AUTHOR));
        assert_eq!(book.catalog_id.as_deref(), Some("0061054887"));
        assert_eq!(book.thumbnail_url, None);
        assert_eq!(book.genre_label, None);
        assert_eq!(book.year, None);
        assert_eq!(book.description, "");
    }

    #[test]
    fn test_multiple_authors_joined() {
        let book = normalize_volume(volume(json!({
            "title": "Good Omens",
            "authors": ["Terry Pratchett", "Neil Gaiman"]
        })));
        assert_eq!(book.author.as_deref(), Some("Terry Pratchett, Neil Gaiman"));
    }

    #[tokio::test]
    async fn test_search_builds_url_and_normalizes() {
        let (client, source) = client(
            json!({ "items": [{ "volumeInfo": { "title": "Dune" } }] }),
            Some("secret"),
        );
        let query = SearchQuery::new("subject:science fiction", 20, SearchOrder::Newest).unwrap();

        let books = client.search(&query).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");

        let urls = source.urls.lock().unwrap();
        let url = reqwest::Url::parse(&urls[0]).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("q".into(), "subject:science fiction".into())));
        assert!(params.contains(&("maxResults".into(), "20".into())));
        assert!(params.contains(&("orderBy".into(), "newest".into())));
        assert!(params.contains(&("key".into(), "secret".into())));
    }

    #[tokio::test]
    async fn test_search_without_key_omits_param() {
        let (client, source) = client(json!({}), None);
        let query = SearchQuery::new("dune", 5, SearchOrder::Relevance).unwrap();

        let books = client.search(&query).await.unwrap();
        assert!(books.is_empty());
        assert!(!source.urls.lock().unwrap()[0].contains("key="));
    }

    #[tokio::test]
    async fn test_lookup_isbn() {
        let (client, source) = client(
            json!({ "items": [
                { "volumeInfo": { "title": "First" } },
                { "volumeInfo": { "title": "Second" } }
            ] }),
            None,
        );

        let book = client.lookup_isbn(" 9780441013593 ").await.unwrap().unwrap();
        assert_eq!(book.title, "First");
        assert!(source.urls.lock().unwrap()[0].contains("isbn%3A9780441013593"));

        let (client, _) = client_empty();
        assert!(client.lookup_isbn("123").await.unwrap().is_none());
        assert!(client.lookup_isbn("  ").await.is_err());
    }

    fn client_empty() -> (GoogleBooksClient, Arc<Canned>) {
        client(json!({ "totalItems": 0 }), None)
    }
}
