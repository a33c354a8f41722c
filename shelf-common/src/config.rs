//! Configuration loading shared by every Shelf service
//!
//! Resolution priority, highest first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing config file is not an error: the service logs a warning and
//! starts on defaults.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SHELF_CONFIG";

/// Environment variable overriding `cache.redis_url`
pub const REDIS_URL_ENV_VAR: &str = "SHELF_REDIS_URL";

/// User-Agent sent on every outbound request
pub fn get_user_agent() -> String {
    format!("Shelf/{} (personal reading library)", env!("CARGO_PKG_VERSION"))
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            host: default_host(),
            port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level directive (trace, debug, info, warn, error); `RUST_LOG` wins
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Cache backend and TTL tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis URL; in-memory cache when unset
    pub redis_url: Option<String>,
    /// Entity-scoped data (author, genre, list)
    pub long_ttl_secs: u64,
    /// User-scoped derived data
    pub short_ttl_secs: u64,
    /// Proxied thumbnails
    pub image_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            long_ttl_secs: 3 * 24 * 60 * 60,
            short_ttl_secs: 30 * 60,
            image_ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

impl CacheConfig {
    pub fn long_ttl(&self) -> Duration {
        Duration::from_secs(self.long_ttl_secs)
    }

    pub fn short_ttl(&self) -> Duration {
        Duration::from_secs(self.short_ttl_secs)
    }

    pub fn image_ttl(&self) -> Duration {
        Duration::from_secs(self.image_ttl_secs)
    }

    /// Apply `SHELF_REDIS_URL`
    pub fn apply_env(&mut self) {
        if let Some(url) = env_override(REDIS_URL_ENV_VAR) {
            self.redis_url = Some(url);
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("cache.long_ttl_secs", self.long_ttl_secs),
            ("cache.short_ttl_secs", self.short_ttl_secs),
            ("cache.image_ttl_secs", self.image_ttl_secs),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{} must be greater than zero", name)));
            }
        }
        Ok(())
    }
}

/// Outbound call limits for one upstream source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Simultaneous in-flight calls
    pub max_concurrent: usize,
    /// Minimum spacing between dispatches (0 disables spacing)
    pub min_spacing_ms: u64,
    /// Hard timeout per attempt
    pub timeout_ms: u64,
    /// Retries after a 429 response
    pub max_retries: u32,
    /// Fixed delay before each retry
    pub retry_delay_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            min_spacing_ms: 200,
            timeout_ms: 10_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
        }
    }
}

impl FetcherConfig {
    pub fn validate(&self, section: &str) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(Error::Config(format!(
                "{}.max_concurrent must be at least 1",
                section
            )));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Config(format!(
                "{}.timeout_ms must be greater than zero",
                section
            )));
        }
        Ok(())
    }
}

/// Non-empty environment variable value
pub fn env_override(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Locate the config file for a module
///
/// Priority: explicit CLI path → `SHELF_CONFIG` → `<config_dir>/shelf/<module>.toml`
/// (only if it exists) → none.
pub fn resolve_config_path(cli_arg: Option<&Path>, module_name: &str) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env_override(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|dir| dir.join("shelf").join(format!("{}.toml", module_name)))
        .filter(|path| path.exists())
}

/// Load a TOML config, falling back to defaults when there is no file
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!("Config file {} not found, using defaults", path.display());
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Validate a fan-out schedule: non-empty, every cap positive
pub fn validate_schedule(name: &str, schedule: &[usize]) -> Result<()> {
    if schedule.is_empty() {
        return Err(Error::Config(format!("{} must not be empty", name)));
    }
    if schedule.iter().any(|cap| *cap == 0) {
        return Err(Error::Config(format!("{} caps must be positive", name)));
    }
    Ok(())
}
