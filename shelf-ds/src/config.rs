//! shelf-ds configuration
//!
//! Sections: `[server]`, `[logging]`, `[cache]`, `[sources]`, `[discovery]`,
//! `[library_fetcher]`, `[metadata_fetcher]`. Every section is optional.

use serde::{Deserialize, Serialize};
use shelf_common::config::{
    env_override, validate_schedule, CacheConfig, FetcherConfig, LoggingConfig, ServerConfig,
};
use shelf_common::{Error, Result};

/// Default listen port for shelf-ds
pub const DEFAULT_PORT: u16 = 5732;

/// Overrides `sources.library_url`
pub const LIBRARY_URL_ENV_VAR: &str = "SHELF_LIBRARY_URL";

/// Overrides `sources.metadata_url`
pub const METADATA_URL_ENV_VAR: &str = "SHELF_METADATA_URL";

/// Collaborating services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Library store base URL (`GET /books/:user_id`)
    pub library_url: String,
    /// Metadata service base URL (`GET /search`, `GET /lists/:name`)
    pub metadata_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            library_url: "http://127.0.0.1:5730".to_string(),
            metadata_url: "http://127.0.0.1:5731".to_string(),
        }
    }
}

/// Flow constants for recommendations and release tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Per-genre caps, highest-ranked genre first; its length is the genre K
    pub genre_schedule: Vec<usize>,
    /// Per-author caps, highest-ranked author first; its length is the author K
    pub author_schedule: Vec<usize>,
    /// Upper bound on merged recommendations
    pub global_cap: usize,
    /// Fewer distinct genres than this switches to curated lists
    pub min_distinct_genres: usize,
    /// Fan-out tasks in flight per request
    pub fan_out_concurrency: usize,
    /// Page size for each catalog query
    pub page_size: u32,
    /// Curated lists used for sparse libraries
    pub fallback_lists: Vec<String>,
    pub freshness_window_months: u32,
    pub new_releases_cap: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            genre_schedule: vec![15, 8, 6, 6, 4],
            author_schedule: vec![10, 8, 6, 6, 4, 4, 3, 3],
            global_cap: 35,
            min_distinct_genres: 3,
            fan_out_concurrency: 4,
            page_size: 20,
            fallback_lists: vec![
                "combined-print-and-e-book-fiction".to_string(),
                "hardcover-fiction".to_string(),
                "hardcover-nonfiction".to_string(),
            ],
            freshness_window_months: 12,
            new_releases_cap: 15,
        }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<()> {
        validate_schedule("discovery.genre_schedule", &self.genre_schedule)?;
        validate_schedule("discovery.author_schedule", &self.author_schedule)?;

        for (name, value) in [
            ("discovery.global_cap", self.global_cap),
            ("discovery.fan_out_concurrency", self.fan_out_concurrency),
            ("discovery.page_size", self.page_size as usize),
            ("discovery.new_releases_cap", self.new_releases_cap),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{} must be at least 1", name)));
            }
        }

        if self.fallback_lists.is_empty() {
            return Err(Error::Config(
                "discovery.fallback_lists must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete shelf-ds configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DsConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheConfig,
    pub sources: SourcesConfig,
    pub discovery: DiscoveryConfig,
    pub library_fetcher: FetcherConfig,
    pub metadata_fetcher: FetcherConfig,
}

impl Default for DsConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::with_port(DEFAULT_PORT),
            logging: LoggingConfig::default(),
            cache: CacheConfig::default(),
            sources: SourcesConfig::default(),
            discovery: DiscoveryConfig::default(),
            library_fetcher: FetcherConfig::default(),
            metadata_fetcher: FetcherConfig::default(),
        }
    }
}

impl DsConfig {
    /// Apply environment overrides on top of file values
    pub fn apply_env(&mut self) {
        self.cache.apply_env();
        if let Some(url) = env_override(LIBRARY_URL_ENV_VAR) {
            self.sources.library_url = url;
        }
        if let Some(url) = env_override(METADATA_URL_ENV_VAR) {
            self.sources.metadata_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;
        self.discovery.validate()?;
        self.library_fetcher.validate("library_fetcher")?;
        self.metadata_fetcher.validate("metadata_fetcher")?;

        for (name, url) in [
            ("sources.library_url", &self.sources.library_url),
            ("sources.metadata_url", &self.sources.metadata_url),
        ] {
            reqwest::Url::parse(url)
                .map_err(|e| Error::Config(format!("{} is not a valid URL: {}", name, e)))?;
        }
        Ok(())
    }
}
