//! Curated list adapter (NYT Books current lists)

use super::{non_blank, secure_url, year_from_date};
use serde::Deserialize;
use shelf_common::fetcher::fetch_json;
use shelf_common::models::{UNKNOWN_AUTHOR, UNKNOWN_TITLE};
use shelf_common::{genres, Book, ByteSource, Error, Result};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct ListResponse {
    pub results: ListResults,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListResults {
    pub published_date: Option<String>,
    pub books: Vec<ListBook>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListBook {
    pub primary_isbn13: Option<String>,
    pub primary_isbn10: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub book_image: Option<String>,
    pub description: Option<String>,
}

/// Normalize one list entry; `genre` is the label owning the list
pub fn normalize_entry(entry: ListBook, genre: Option<&str>, published_date: Option<&str>) -> Book {
    let mut book = Book::titled(non_blank(entry.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string()));
    book.catalog_id = non_blank(entry.primary_isbn13).or_else(|| non_blank(entry.primary_isbn10));
    book.author = Some(non_blank(entry.author).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()));
    book.thumbnail_url = non_blank(entry.book_image).map(|url| secure_url(&url));
    book.genre_label = genre.map(String::from);
    book.year = published_date.and_then(year_from_date);
    book.description = entry.description.unwrap_or_default();
    book
}

/// List names are lowercase slugs
fn validate_list_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(Error::Validation(format!("invalid list name '{}'", name)))
    }
}

/// Client for the curated-list catalog
pub struct NytListsClient {
    source: Arc<dyn ByteSource>,
    api_url: String,
    api_key: Option<String>,
}

impl NytListsClient {
    pub fn new(source: Arc<dyn ByteSource>, api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            source,
            api_url: api_url.into(),
            api_key,
        }
    }

    fn list_url(&self, list_name: &str) -> Result<String> {
        let base = format!("{}/{}.json", self.api_url.trim_end_matches('/'), list_name);
        let url = match &self.api_key {
            Some(key) => reqwest::Url::parse_with_params(&base, &[("api-key", key.as_str())]),
            None => reqwest::Url::parse(&base),
        };

        url.map(String::from)
            .map_err(|e| Error::Config(format!("invalid lists API URL {}: {}", base, e)))
    }

    /// Current entries of a curated list
    pub async fn list(&self, list_name: &str) -> Result<Vec<Book>> {
        let list_name = list_name.trim().to_lowercase();
        validate_list_name(&list_name)?;

        let url = self.list_url(&list_name)?;
        let response: ListResponse = fetch_json(self.source.as_ref(), &url).await?;

        let genre = genres::by_list_name(&list_name).map(|entry| entry.label);
        let published = response.results.published_date;

        debug!(
            source = self.source.source_name(),
            list = %list_name,
            entries = response.results.books.len(),
            "Curated list fetched"
        );

        Ok(response
            .results
            .books
            .into_iter()
            .map(|entry| normalize_entry(entry, genre, published.as_deref()))
            .collect())
    }
}
