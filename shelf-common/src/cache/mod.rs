//! Cache Store
//!
//! Text-valued key/value store with per-entry TTL. Entries read after their
//! TTL behave exactly like missing entries. Backends are injected as
//! `Arc<dyn CacheStore>`; there is no process-wide cache.
//!
//! ```text
//! request → CacheStore::get ──hit──→ response
//!                 │
//!                miss → recompute → CacheStore::set(ttl) → response
//! ```
//!
//! Cache failures never fail a request: the JSON helpers below log and
//! degrade to a miss, and undecodable payloads are deleted.

pub mod keys;
mod memory;
#[cfg(feature = "redis")]
mod redis_store;

pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_store::RedisCache;

use crate::config::CacheConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Key/value store with per-entry TTL, safe for concurrent use per key
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Value for `key`, or `None` when missing or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key` for `ttl` (must be non-zero)
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Drop `key` if present
    async fn delete(&self, key: &str) -> Result<()>;

    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;
}

/// Reject zero TTLs before they reach a backend
pub(crate) fn check_ttl(key: &str, ttl: Duration) -> Result<()> {
    if ttl.is_zero() {
        return Err(Error::Validation(format!(
            "cache TTL for '{}' must be greater than zero",
            key
        )));
    }
    Ok(())
}

/// Build the configured backend
///
/// Uses Redis when `redis_url` is set and the `redis` feature is compiled in;
/// otherwise an in-process [`MemoryCache`].
pub async fn connect(config: &CacheConfig) -> Result<Arc<dyn CacheStore>> {
    match config.redis_url.as_deref() {
        #[cfg(feature = "redis")]
        Some(url) => {
            let store = RedisCache::connect(url).await?;
            tracing::info!("Cache backend: redis");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        Some(_) => {
            warn!("cache.redis_url is set but the redis feature is not compiled in; using in-memory cache");
            Ok(Arc::new(MemoryCache::new()))
        }
        None => {
            tracing::info!("Cache backend: memory");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}

/// Read and decode a JSON entry
///
/// Backend errors degrade to a miss. A payload that no longer decodes is
/// deleted and reported as a miss.
pub async fn get_json<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "Cache miss");
            return None;
        }
        Err(e) => {
            warn!(key, error = %e, "Cache read failed, treating as miss");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => {
            debug!(key, "Cache hit");
            Some(value)
        }
        Err(e) => {
            warn!(key, error = %e, "Corrupted cache entry, discarding");
            if let Err(e) = store.delete(key).await {
                warn!(key, error = %e, "Failed to delete corrupted cache entry");
            }
            None
        }
    }
}

/// Encode and store a JSON entry (best-effort)
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Duration,
) {
    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(key, error = %e, "Failed to encode cache entry");
            return;
        }
    };

    if let Err(e) = store.set(key, payload, ttl).await {
        warn!(key, error = %e, "Cache write failed");
    }
}
