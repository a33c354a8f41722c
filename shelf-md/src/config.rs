//! shelf-md configuration
//!
//! TOML layout (every section optional):
//!
//! ```toml
//! [server]
//! port = 5731
//!
//! [catalog]
//! books_api_url = "https://www.googleapis.com/books/v1/volumes"
//! books_api_key = "..."
//!
//! [books_fetcher]
//! max_concurrent = 3
//! ```

use serde::{Deserialize, Serialize};
use shelf_common::config::{
    env_override, CacheConfig, FetcherConfig, LoggingConfig, ServerConfig,
};
use shelf_common::{Error, Result};

/// Default listen port for shelf-md
pub const DEFAULT_PORT: u16 = 5731;

/// Overrides `catalog.books_api_key`
pub const BOOKS_API_KEY_ENV_VAR: &str = "SHELF_GOOGLE_BOOKS_API_KEY";

/// Overrides `catalog.lists_api_key`
pub const LISTS_API_KEY_ENV_VAR: &str = "SHELF_NYT_API_KEY";

/// Upstream catalog endpoints and credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Volumes search endpoint
    pub books_api_url: String,
    pub books_api_key: Option<String>,
    /// Base URL of current curated lists; `/<list>.json` is appended
    pub lists_api_url: String,
    pub lists_api_key: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            books_api_url: "https://www.googleapis.com/books/v1/volumes".to_string(),
            books_api_key: None,
            lists_api_url: "https://api.nytimes.com/svc/books/v3/lists/current".to_string(),
            lists_api_key: None,
        }
    }
}

/// Complete shelf-md configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MdConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheConfig,
    pub catalog: CatalogConfig,
    pub books_fetcher: FetcherConfig,
    pub lists_fetcher: FetcherConfig,
    pub image_fetcher: FetcherConfig,
}

impl Default for MdConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::with_port(DEFAULT_PORT),
            logging: LoggingConfig::default(),
            cache: CacheConfig::default(),
            catalog: CatalogConfig::default(),
            books_fetcher: FetcherConfig::default(),
            lists_fetcher: FetcherConfig::default(),
            image_fetcher: FetcherConfig::default(),
        }
    }
}

impl MdConfig {
    /// Apply environment overrides on top of file values
    pub fn apply_env(&mut self) {
        self.cache.apply_env();
        if let Some(key) = env_override(BOOKS_API_KEY_ENV_VAR) {
            self.catalog.books_api_key = Some(key);
        }
        if let Some(key) = env_override(LISTS_API_KEY_ENV_VAR) {
            self.catalog.lists_api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;
        self.books_fetcher.validate("books_fetcher")?;
        self.lists_fetcher.validate("lists_fetcher")?;
        self.image_fetcher.validate("image_fetcher")?;

        for (name, url) in [
            ("catalog.books_api_url", &self.catalog.books_api_url),
            ("catalog.lists_api_url", &self.catalog.lists_api_url),
        ] {
            reqwest::Url::parse(url)
                .map_err(|e| Error::Config(format!("{} is not a valid URL: {}", name, e)))?;
        }
        Ok(())
    }
}
