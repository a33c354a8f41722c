//! In-process cache backend with lazy expiry

use super::{check_ttl, CacheStore};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    written_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.written_at) >= self.ttl
    }
}

/// Entry count above which `set` drops expired entries
pub const DEFAULT_SWEEP_THRESHOLD: usize = 4096;

#[derive(Debug)]
struct Entries {
    map: HashMap<String, Entry>,
    /// Size at which the next `set` sweeps
    next_sweep: usize,
}

/// In-memory [`CacheStore`]
///
/// Expired entries are dropped when read, and by `set` once the map grows
/// past the sweep threshold. The next sweep waits until the map reaches
/// twice its surviving size. No background task.
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<Entries>,
    sweep_threshold: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_sweep_threshold(DEFAULT_SWEEP_THRESHOLD)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_threshold(sweep_threshold: usize) -> Self {
        Self {
            entries: RwLock::new(Entries {
                map: HashMap::new(),
                next_sweep: sweep_threshold,
            }),
            sweep_threshold,
        }
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.map.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.map.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: re-check under the write lock, a concurrent set may have refreshed it
        let mut entries = self.entries.write().await;
        if entries.map.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.map.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        check_ttl(key, ttl)?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if entries.map.len() >= entries.next_sweep {
            let before = entries.map.len();
            entries.map.retain(|_, entry| !entry.is_expired(now));
            let live = entries.map.len();
            entries.next_sweep = self.sweep_threshold.max(live.saturating_mul(2));
            debug!(dropped = before - live, live, "Swept expired cache entries");
        }

        entries.map.insert(
            key.to_string(),
            Entry {
                value,
                written_at: now,
                ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.map.remove(key);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
