use folio_core::CacheStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub mod backends;
pub mod invalidator;
pub mod pattern;

pub use backends::*;
pub use invalidator::CacheInvalidator;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis connection URL. Without one the in-process store is used.
    pub redis_url: Option<String>,
    pub op_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            op_timeout: Duration::from_secs(2),
        }
    }
}

/// Picks the cache backend once, at startup. An unreachable Redis falls back to memory.
pub async fn create_cache(config: &CacheConfig) -> Arc<dyn CacheStore> {
    match config.redis_url.as_deref() {
        Some(url) => connect_redis(url, config.op_timeout).await,
        None => {
            tracing::info!("💾 No Redis URL configured, using in-memory cache");
            Arc::new(MemoryCache::new())
        }
    }
}

#[cfg(feature = "redis")]
async fn connect_redis(url: &str, op_timeout: Duration) -> Arc<dyn CacheStore> {
    match RedisCache::connect(url, op_timeout).await {
        Ok(cache) => {
            tracing::info!("💾 Connected to Redis cache");
            Arc::new(cache)
        }
        Err(e) => {
            tracing::warn!("⚠️ {}; falling back to in-memory cache", e);
            Arc::new(MemoryCache::new())
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn connect_redis(_url: &str, _op_timeout: Duration) -> Arc<dyn CacheStore> {
    tracing::warn!("⚠️ Redis URL configured but the redis feature is disabled; using in-memory cache");
    Arc::new(MemoryCache::new())
}

/// Reads and decodes a JSON payload. Undecodable payloads count as a miss.
pub async fn get_json<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Option<T> {
    let raw = store.get(key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("⚠️ Discarding undecodable cache entry {}: {}", key, e);
            None
        }
    }
}

pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Duration,
) -> bool {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw, ttl).await,
        Err(e) => {
            tracing::warn!("⚠️ Could not encode cache entry {}: {}", key, e);
            false
        }
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_cache, get_json, set_json, CacheConfig, CacheInvalidator};
    pub use folio_core::CacheStore;
}
