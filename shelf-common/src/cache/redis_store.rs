//! Redis cache backend (`redis` feature)
//!
//! `GET key` / `SET key value EX seconds` / `DEL key` over a reconnecting
//! connection manager.

use super::{check_ttl, CacheStore};
use crate::{Error, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

/// Redis-backed [`CacheStore`]
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Config(format!("invalid redis url: {}", e)))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::Cache(format!("redis connection failed: {}", e)))?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get(key)
            .await
            .map_err(|e| Error::Cache(format!("GET {}: {}", key, e)))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        check_ttl(key, ttl)?;
        // Sub-second TTLs round up, never down to zero
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| Error::Cache(format!("SET {}: {}", key, e)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| Error::Cache(format!("DEL {}: {}", key, e)))
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
