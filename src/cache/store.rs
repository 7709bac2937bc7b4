//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and a
//! freshness window enforced on read.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::models::WeatherRecord;

// == Weather Cache ==
/// Bounded location -> record cache with LRU eviction and lazy expiration.
///
/// Keys are case-folded on every operation. Capacity is enforced on write,
/// freshness on read; there is no background sweep.
#[derive(Debug)]
pub struct WeatherCache {
    /// Normalized key -> entry storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker (reads and writes both count)
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Maximum entry age still served
    freshness: Duration,
}

/// Case-folds a location name into its cache key.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

impl WeatherCache {
    // == Constructor ==
    /// Creates a new WeatherCache with the given capacity and freshness window.
    pub fn new(capacity: usize, freshness: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            capacity,
            freshness,
        }
    }

    // == Put ==
    /// Stores a record under `key`, replacing any previous entry.
    ///
    /// The entry becomes the most recently used. If the insertion pushes the
    /// cache over capacity, the least recently used entry is evicted and its
    /// key returned.
    pub fn put(&mut self, key: &str, value: WeatherRecord) -> Option<String> {
        let key = normalize_key(key);

        self.entries.insert(key.clone(), CacheEntry::new(value));
        self.lru.touch(&key);

        let mut evicted = None;
        while self.entries.len() > self.capacity {
            match self.lru.evict_oldest() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    self.stats.record_eviction();
                    evicted = Some(oldest);
                }
                None => break,
            }
        }

        self.stats.set_total_entries(self.entries.len());
        evicted
    }

    // == Get If Fresh ==
    /// Returns the record for `key` if it is present and fresh.
    ///
    /// A fresh hit becomes the most recently used entry. A stale entry is
    /// removed as a side effect and reported as absent.
    pub fn get_if_fresh(&mut self, key: &str) -> Option<WeatherRecord> {
        let key = normalize_key(key);

        let fresh = match self.entries.get(&key) {
            Some(entry) => entry.is_fresh(self.freshness),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if !fresh {
            self.entries.remove(&key);
            self.lru.remove(&key);
            self.stats.record_expiration();
            self.stats.set_total_entries(self.entries.len());
            return None;
        }

        self.lru.touch(&key);
        self.stats.record_hit();
        self.entries.get(&key).map(|entry| entry.value.clone())
    }

    // == Peek ==
    /// Returns a copy of the entry without touching recency or freshness.
    pub fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(&normalize_key(key)).cloned()
    }

    // == Remove ==
    /// Removes an entry by key. Returns whether an entry was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let key = normalize_key(key);
        let removed = self.entries.remove(&key).is_some();
        if removed {
            self.lru.remove(&key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Keys ==
    /// Returns every resident key, fresh or stale, most recent first.
    pub fn keys(&self) -> Vec<String> {
        self.lru.iter().map(str::to_string).collect()
    }

    // == Snapshot All ==
    /// Copies every resident key and record, ignoring freshness.
    ///
    /// Does not affect recency.
    pub fn snapshot_all(&self) -> Vec<(String, WeatherRecord)> {
        self.lru
            .iter()
            .filter_map(|key| {
                self.entries
                    .get(key)
                    .map(|entry| (key.to_string(), entry.value.clone()))
            })
            .collect()
    }

    // == Clear ==
    /// Removes all entries unconditionally.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
