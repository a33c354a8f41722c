//! Book record shared by every Shelf service
//!
//! Wire names follow the library store's row shape (`isbn`, `thumbnail`,
//! `genre`) so records round-trip between the library store, the metadata
//! service and the discovery service unchanged.

use serde::{Deserialize, Deserializer, Serialize};

/// Title used when a provider payload has none
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Author used when a provider payload has none
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// A single book, normalized from a provider or loaded from a user's library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Catalog identifier (ISBN-13 preferred, else ISBN-10)
    #[serde(rename = "isbn", default)]
    pub catalog_id: Option<String>,
    #[serde(default = "unknown_title", deserialize_with = "title_or_unknown")]
    pub title: String,
    /// Nullable in library rows; adapters always fill it
    #[serde(default)]
    pub author: Option<String>,
    #[serde(rename = "thumbnail", default)]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "genre", default)]
    pub genre_label: Option<String>,
    /// Four-digit year string
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

impl Book {
    /// Minimal record with just a title; used by adapters and tests
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            catalog_id: None,
            title: title.into(),
            author: None,
            thumbnail_url: None,
            genre_label: None,
            year: None,
            description: String::new(),
        }
    }

    /// Catalog id, ignoring blank strings
    pub fn id(&self) -> Option<&str> {
        self.catalog_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Largest page the search catalog serves
pub const MAX_SEARCH_RESULTS: u32 = 40;

/// Default page size for catalog searches
pub const DEFAULT_SEARCH_RESULTS: u32 = 20;

/// Result ordering understood by the search catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOrder {
    #[default]
    Relevance,
    Newest,
}

impl SearchOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Relevance => "relevance",
            SearchOrder::Newest => "newest",
        }
    }
}

impl std::str::FromStr for SearchOrder {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SearchOrder::Relevance),
            "newest" => Ok(SearchOrder::Newest),
            other => Err(crate::Error::Validation(format!(
                "orderBy must be 'relevance' or 'newest', got '{}'",
                other
            ))),
        }
    }
}

/// A catalog search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: String,
    pub max_results: u32,
    pub order_by: SearchOrder,
}

impl SearchQuery {
    /// Validated query: `q` must be non-blank, page size clamped to 1..=40
    pub fn new(q: impl Into<String>, max_results: u32, order_by: SearchOrder) -> crate::Result<Self> {
        let q = q.into();
        if q.trim().is_empty() {
            return Err(crate::Error::Validation(
                "query parameter q is required".to_string(),
            ));
        }
        Ok(Self {
            q: q.trim().to_string(),
            max_results: max_results.clamp(1, MAX_SEARCH_RESULTS),
            order_by,
        })
    }
}

fn unknown_title() -> String {
    UNKNOWN_TITLE.to_string()
}

fn title_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let title = Option::<String>::deserialize(deserializer)?;
    Ok(title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(unknown_title))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
