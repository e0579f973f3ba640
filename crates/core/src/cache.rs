//! In-memory TTL cache with size-bounded eviction
//!
//! Used for:
//! - Geocoding results keyed by normalized address
//! - Directions results keyed by origin/destination pair
//!
//! Expired entries are dropped lazily on read and eagerly on every write.
//! When the map still exceeds `max_entries` after purging, the oldest entries
//! by creation time are evicted first.
//!
//! # Example
//!
//! ```rust
//! use storefinder_core::cache::{CacheConfig, TtlCache};
//! use std::time::Duration;
//!
//! let mut cache = TtlCache::new(CacheConfig::default());
//! cache.insert("koramangala".to_string(), 42, Some(Duration::from_secs(60)));
//! assert_eq!(cache.get(&"koramangala".to_string()), Some(42));
//! ```

use crate::clock::{SharedClock, SystemClock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Longest lifetime an entry can get; larger TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries kept after a write
    pub max_entries: usize,
    /// TTL applied when an insert does not specify one
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

/// A cached value with its lifetime
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,
    /// When the entry was written
    pub created_at: Instant,
    /// When the entry stops being served
    pub expires_at: Instant,
    seq: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// TTL cache with oldest-first eviction
pub struct TtlCache<K, V> {
    config: CacheConfig,
    entries: HashMap<K, CacheEntry<V>>,
    clock: SharedClock,
    next_seq: u64,
    evictions: u64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new cache using the system clock
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock::shared())
    }

    /// Create a new cache reading time from `clock`
    #[must_use]
    pub fn with_clock(config: CacheConfig, clock: SharedClock) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            clock,
            next_seq: 0,
            evictions: 0,
        }
    }

    /// Get a cached value, dropping it if it has expired
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = self.clock.now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Peek at an entry without touching expiry
    #[must_use]
    pub fn entry(&self, key: &K) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    /// Insert a value, then purge expired entries and enforce the size bound
    pub fn insert(&mut self, key: K, value: V, ttl: Option<Duration>) {
        let now = self.clock.now();
        let ttl = ttl.unwrap_or(self.config.default_ttl).min(MAX_TTL);

        let entry = CacheEntry {
            value,
            created_at: now,
            expires_at: now.checked_add(ttl).unwrap_or(now),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.insert(key, entry);

        self.cleanup();
        self.evict_oldest();
    }

    /// Remove a cached value
    pub fn remove(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Clear all cached values
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, including any not yet purged
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the cache holds an entry for `key`, expired or not
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Clean up expired entries
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        CacheStats {
            total_entries: self.entries.len(),
            expired_entries: self.entries.values().filter(|e| e.is_expired(now)).count(),
            max_entries: self.config.max_entries,
            evictions: self.evictions,
        }
    }

    fn evict_oldest(&mut self) {
        if self.entries.len() <= self.config.max_entries {
            return;
        }

        let excess = self.entries.len() - self.config.max_entries;
        let mut by_age: Vec<(Instant, u64, K)> = self
            .entries
            .iter()
            .map(|(k, e)| (e.created_at, e.seq, k.clone()))
            .collect();
        by_age.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        for (_, _, key) in by_age.into_iter().take(excess) {
            self.entries.remove(&key);
            self.evictions += 1;
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Total number of cache entries
    pub total_entries: usize,
    /// Number of expired entries not yet purged
    pub expired_entries: usize,
    /// Configured size bound
    pub max_entries: usize,
    /// Entries evicted by the size bound since creation
    pub evictions: u64,
}
