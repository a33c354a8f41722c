//! Image Cache Codec
//!
//! Thumbnails are stored as base64 text under `img_cache:<sha256(url)>`.
//! Decoded bytes must start with the JPEG signature; anything else is treated
//! as corruption: the entry is dropped and the origin fetched once more.

use base64::{engine::general_purpose, Engine as _};
use shelf_common::cache::keys;
use shelf_common::{ByteSource, CacheStore, Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// JPEG start-of-image marker
pub const JPEG_SIGNATURE: [u8; 2] = [0xFF, 0xD8];

/// Bytes to cache text
pub fn encode(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// More than the signature alone, and starting with it
pub fn has_signature(bytes: &[u8]) -> bool {
    bytes.len() > JPEG_SIGNATURE.len() && bytes.starts_with(&JPEG_SIGNATURE)
}

/// Decode cache text, `None` unless it yields signed image bytes
pub fn decode_validated(text: &str) -> Option<Vec<u8>> {
    general_purpose::STANDARD
        .decode(text.trim())
        .ok()
        .filter(|bytes| has_signature(bytes))
}

fn validate_origin_url(url: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| Error::Validation(format!("invalid image url '{}': {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Validation(format!(
            "unsupported image url scheme '{}'",
            other
        ))),
    }
}

/// Cache-fronted thumbnail proxy
pub struct ImageCache {
    cache: Arc<dyn CacheStore>,
    origin: Arc<dyn ByteSource>,
    ttl: Duration,
}

impl ImageCache {
    pub fn new(cache: Arc<dyn CacheStore>, origin: Arc<dyn ByteSource>, ttl: Duration) -> Self {
        Self { cache, origin, ttl }
    }

    /// Image bytes for `url`, from cache when a valid entry exists
    pub async fn get(&self, url: &str) -> Result<Vec<u8>> {
        validate_origin_url(url)?;
        let key = keys::image(url);

        match self.cache.get(&key).await {
            Ok(Some(text)) => match decode_validated(&text) {
                Some(bytes) => {
                    debug!(key = %key, "Image cache hit");
                    return Ok(bytes);
                }
                None => {
                    warn!(key = %key, url, "Corrupted image cache entry, refetching");
                    if let Err(e) = self.cache.delete(&key).await {
                        warn!(key = %key, error = %e, "Failed to delete corrupted image entry");
                    }
                }
            },
            Ok(None) => debug!(key = %key, "Image cache miss"),
            Err(e) => warn!(key = %key, error = %e, "Image cache read failed, treating as miss"),
        }

        let bytes = self.origin.fetch(url).await?;

        if has_signature(&bytes) {
            if let Err(e) = self.cache.set(&key, encode(&bytes), self.ttl).await {
                warn!(key = %key, error = %e, "Image cache write failed");
            }
        } else {
            warn!(url, len = bytes.len(), "Origin image lacks JPEG signature, not caching");
        }

        Ok(bytes)
    }
}
