use async_trait::async_trait;
use folio_core::{CacheStore, Error, Result};
use futures_util::StreamExt;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use super::memory::MAX_TTL;
use crate::pattern;

/// Durable store shared across instances. Redis owns expiry through `SET … EX`.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}

impl RedisCache {
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Cache(format!("Invalid Redis URL: {}", e)))?;

        let conn = tokio::time::timeout(op_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| Error::Cache("Timed out connecting to Redis".to_string()))?
            .map_err(|e| Error::Cache(format!("Failed to connect to Redis: {}", e)))?;

        let cache = Self { conn, op_timeout };
        cache.ping().await?;
        Ok(cache)
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(|e| Error::Cache(format!("Redis {} failed: {}", op, e))),
            Err(_) => Err(Error::Cache(format!("Redis {} timed out after {:?}", op, self.op_timeout))),
        }
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        self.bounded("PING", async move {
            redis::cmd("PING").query_async::<_, String>(&mut conn).await
        })
        .await?;
        Ok(())
    }

    async fn try_get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        self.bounded("GET", async move { conn.get::<_, Option<String>>(key).await })
            .await
    }

    async fn try_set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let seconds = ttl.min(MAX_TTL).as_secs().max(1);
        self.bounded("SET", async move {
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(seconds)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await
    }

    async fn try_invalidate(&self, pattern: &str) -> Result<usize> {
        let glob = pattern::to_redis_glob(pattern);
        let mut scan_conn = self.conn.clone();
        let keys: Vec<String> = self
            .bounded("SCAN", async move {
                let iter = scan_conn.scan_match::<_, String>(glob).await?;
                Ok::<_, redis::RedisError>(iter.collect::<Vec<String>>().await)
            })
            .await?;

        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let count = keys.len();
        self.bounded("DEL", async move { conn.del::<_, ()>(keys).await })
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, key: &str) -> Option<String> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("⚠️ Cache read for {} treated as miss: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> bool {
        match self.try_set(key, value, ttl).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("⚠️ Cache write for {} skipped: {}", key, e);
                false
            }
        }
    }

    async fn invalidate(&self, pattern: &str) {
        match self.try_invalidate(pattern).await {
            Ok(count) => tracing::debug!("Invalidated {} Redis keys matching {}", count, pattern),
            Err(e) => tracing::warn!("⚠️ Cache invalidation for {} failed: {}", pattern, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let result = RedisCache::connect("not a redis url", Duration::from_millis(200)).await;
        assert!(matches!(result, Err(Error::Cache(_))));
    }

    #[tokio::test]
    async fn test_connect_fails_when_unreachable() {
        let result = RedisCache::connect("redis://127.0.0.1:1", Duration::from_millis(500)).await;
        assert!(matches!(result, Err(Error::Cache(_))));
    }
}
