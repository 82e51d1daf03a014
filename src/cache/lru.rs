//! In-process LRU backend.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;

use super::CacheBackend;
use crate::CacheHelperResult;

const FALLBACK_CAPACITY: usize = 100;

/// A stored value.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    /// Serialized value.
    pub value: Vec<u8>,

    /// When it was stored.
    pub cached_at: DateTime<Utc>,

    /// When it stops being served. `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedEntry {
    /// Creates an entry that lives for `ttl` (forever if `None`).
    pub fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let cached_at = Utc::now();
        // A TTL too large for chrono is treated as no expiry.
        let expires_at = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|ttl| cached_at.checked_add_signed(ttl));
        Self {
            value,
            cached_at,
            expires_at,
        }
    }

    /// Checks whether the entry has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Current number of entries.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Number of hits.
    pub hits: u64,

    /// Number of misses (absent or expired).
    pub misses: u64,
}

impl CacheStats {
    /// Computes the hit rate.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded in-memory store with per-entry expiry.
///
/// Least recently used entries are evicted once `capacity` is reached.
/// Expired entries are dropped lazily on read or by
/// [`cleanup_expired`](Self::cleanup_expired).
pub struct MemoryBackend {
    cache: Mutex<LruCache<String, CachedEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryBackend {
    /// Creates a backend holding at most `capacity` entries.
    ///
    /// A zero capacity falls back to 100.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(FALLBACK_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let cache = self.cache.lock();
        CacheStats {
            size: cache.len(),
            capacity: cache.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes expired entries and returns how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let mut cache = self.cache.lock();
        let expired_keys: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            cache.pop(key);
        }
        expired_keys.len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl CacheBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> CacheHelperResult<Option<Vec<u8>>> {
        let mut cache = self.cache.lock();

        // Peek first so an expired entry does not get promoted.
        match cache.peek(key).map(CachedEntry::is_expired) {
            Some(true) => {
                cache.pop(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Some(false) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(cache.get(key).map(|entry| entry.value.clone()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheHelperResult<()> {
        self.cache
            .lock()
            .put(key.to_string(), CachedEntry::new(value, ttl));
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheHelperResult<bool> {
        Ok(self.cache.lock().pop(key).is_some())
    }

    fn contains_key(&self, key: &str) -> CacheHelperResult<bool> {
        Ok(self
            .cache
            .lock()
            .peek(key)
            .is_some_and(|entry| !entry.is_expired()))
    }

    fn clear(&self) -> CacheHelperResult<()> {
        self.cache.lock().clear();
        Ok(())
    }
}
