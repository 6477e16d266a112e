//! TTL response cache
//!
//! A bounded map from cache key to JSON response. Entries expire a fixed
//! time after insertion and are purged lazily when read. When the map is
//! full, the entry closest to expiry is evicted. With a single TTL this is
//! the oldest insertion; reads do not refresh an entry, so this is not LRU.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Longest TTL honoured; keeps `Instant + ttl` from overflowing
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Async-aware TTL cache for upstream JSON responses
#[derive(Debug)]
pub struct TtlCache {
    ttl: Duration,
    max_size: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    /// Create a cache. A zero `ttl` disables caching; `ttl` is capped at
    /// [`MAX_TTL`] and `max_size` is at least 1.
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        Self {
            ttl: ttl.min(MAX_TTL),
            max_size: max_size.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Look up a live entry, dropping it if it has expired
    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;
        let expired = entries.get(key)?.is_expired(Instant::now());
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store a value, evicting the soonest-to-expire entry when full
    pub async fn set(&self, key: impl Into<String>, value: Value) {
        if self.ttl.is_zero() {
            return;
        }

        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };

        let mut entries = self.entries.lock().await;
        if entries.len() >= self.max_size {
            Self::evict_one(&mut entries);
        }
        entries.insert(key.into(), entry);
    }

    /// Remove every entry
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of stored entries, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn evict_one(entries: &mut HashMap<String, CacheEntry>) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            entries.remove(&key);
        }
    }
}
