//! Caching module for lookup results
//!
//! Provides a bounded, time-expiring store keyed by normalized query text.
//! Every lookup kind (place, address, geocode, image) uses the same store with
//! its own TTL and capacity.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Source of "now" for TTL checks
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A cached value and the moment it was written
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at_millis: i64,
}

impl<V> CacheEntry<V> {
    /// Whether the entry has outlived `ttl_millis` at `now`
    pub fn is_expired(&self, now: i64, ttl_millis: i64) -> bool {
        now - self.inserted_at_millis > ttl_millis
    }
}

/// Hit/miss counters for a cache store
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded key/value store with TTL expiry and insertion-order eviction.
///
/// Reads never refresh an entry's position, so when the store is full the
/// entry written earliest is the one evicted. Overwriting a key counts as a
/// fresh insert of that key.
pub struct CacheStore<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    capacity: usize,
    ttl_millis: i64,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> CacheStore<V> {
    /// Create a store using the wall clock
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    /// Create a store with a custom clock
    pub fn with_clock(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            capacity: cap.get(),
            ttl_millis: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get a cached value, dropping it if it has expired
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_millis();
        let mut entries = self.lock();

        // peek keeps insertion order intact
        let expired = entries
            .peek(key)
            .map(|entry| entry.is_expired(now, self.ttl_millis));

        match expired {
            Some(false) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                entries.peek(key).map(|entry| entry.value.clone())
            }
            Some(true) => {
                entries.pop(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a value, evicting the oldest insert when full
    pub fn put(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            inserted_at_millis: self.clock.now_millis(),
        };
        let mut entries = self.lock();
        let key = key.into();
        // Re-inserting moves the key to the newest position
        entries.pop(&key);
        entries.push(key, entry);
    }

    /// Whether a live entry exists for `key`, without touching the counters
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now_millis();
        self.lock()
            .peek(key)
            .map(|entry| !entry.is_expired(now, self.ttl_millis))
            .unwrap_or(false)
    }

    /// Number of entries currently held, expired ones included
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the store's counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry<V>>> {
        // Entries are replaced wholesale, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> std::fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("capacity", &self.capacity)
            .field("ttl_millis", &self.ttl_millis)
            .finish_non_exhaustive()
    }
}
