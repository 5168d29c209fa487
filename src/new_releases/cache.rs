//! Short-lived cache of serialized responses.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    inserted_at: Instant,
}

/// Bounded LRU map from a request's cache key to its serialized body.
///
/// Expiry is checked lazily on read. Two concurrent misses for the same key
/// both compute and the later `put` wins.
pub struct ResultCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    pub fn put(&self, key: String, body: String) {
        self.put_at(key, body, Instant::now());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => now.saturating_duration_since(entry.inserted_at) > self.ttl,
        };
        if expired {
            entries.pop(key);
            return None;
        }
        entries.get(key).map(|entry| entry.body.clone())
    }

    fn put_at(&self, key: String, body: String, now: Instant) {
        self.lock().put(
            key,
            CacheEntry {
                body,
                inserted_at: now,
            },
        );
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}
