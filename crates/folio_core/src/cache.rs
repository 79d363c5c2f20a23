use async_trait::async_trait;
use std::time::Duration;

pub const ARTICLES_TTL: Duration = Duration::from_secs(3600);
pub const SERIES_TTL: Duration = Duration::from_secs(3600);
pub const SHORT_TTL: Duration = Duration::from_secs(300);

/// Key/value store with per-key expiry sitting in front of the upstream API.
///
/// Implementations never surface their own failures: a backend that cannot
/// answer behaves as if every lookup were a miss and every write a no-op.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short name of the backing store, used in logs and response metadata
    fn name(&self) -> &str;

    /// Get the payload stored under `key`, if present and not expired
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous entry
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> bool;

    /// Delete every key matching `pattern`, where `*` matches any substring
    async fn invalidate(&self, pattern: &str);
}
