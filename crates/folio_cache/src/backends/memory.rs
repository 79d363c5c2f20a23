use async_trait::async_trait;
use folio_core::CacheStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use crate::pattern;

/// Entries held before writes start dropping stale and soonest-expiring keys.
pub const DEFAULT_CAPACITY: usize = 1024;
/// Longest lifetime an entry can be given.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

enum Lookup {
    Hit(String),
    Miss,
    Expired,
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

pub struct MemoryStore {
    entries: HashMap<String, Entry>,
    capacity: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    fn lookup(&self, key: &str, now: Instant) -> Lookup {
        match self.entries.get(key) {
            None => Lookup::Miss,
            Some(entry) if entry.is_live(now) => Lookup::Hit(entry.value.clone()),
            Some(_) => Lookup::Expired,
        }
    }

    fn evict_if_expired(&mut self, key: &str, now: Instant) {
        let expired = self.entries.get(key).map_or(false, |e| !e.is_live(now));
        if expired {
            self.entries.remove(key);
        }
    }

    pub fn set(&mut self, key: &str, value: &str, ttl: Duration, now: Instant) {
        if !self.entries.contains_key(key) && self.entries.len() >= self.capacity {
            self.make_room(now);
        }

        let expires_at = now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now);
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    /// Drops every expired entry, then the soonest-expiring one if still full.
    fn make_room(&mut self, now: Instant) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        let swept = before - self.entries.len();
        if swept > 0 {
            tracing::debug!("Swept {} expired cache entries", swept);
        }

        if self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                self.entries.remove(&key);
            }
        }
    }

    pub fn invalidate(&mut self, pattern: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !pattern::matches(pattern, key));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// In-process fallback store. Entries expire lazily on the read that finds
/// them stale, and writes to a full store sweep out whatever has expired.
#[derive(Clone, Default)]
pub struct MemoryCache {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::with_capacity(capacity))),
        }
    }

    /// Number of entries held, expired or not
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Time left before `key` expires, if it is present and live
    pub async fn expires_in(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let store = self.store.read().await;
        store
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at - now)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let lookup = self.store.read().await.lookup(key, now);
        match lookup {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss => None,
            Lookup::Expired => {
                self.store.write().await.evict_if_expired(key, now);
                tracing::debug!("Evicted expired cache entry {}", key);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> bool {
        let mut store = self.store.write().await;
        store.set(key, value, ttl, Instant::now());
        true
    }

    async fn invalidate(&self, pattern: &str) {
        let removed = self.store.write().await.invalidate(pattern);
        tracing::debug!("Invalidated {} cache entries matching {}", removed, pattern);
    }
}
