//! Conversion Cache Module
//!
//! Bounded map from (formula text, normalized options) to converted output,
//! with LRU eviction and hit/miss accounting.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, info};

use crate::cache::{CacheStats, LruList};
use crate::engine::Direction;

/// Recency-list payload: enough to find the entry again on eviction.
#[derive(Debug, Clone)]
struct EntryKey<K> {
    text: String,
    options: K,
}

#[derive(Debug)]
struct Entry {
    output: String,
    /// Position in the recency list
    slot: usize,
}

// == Conversion Cache ==
/// One direction's memo table.
///
/// Entries are grouped by option key, then by formula text, so a lookup
/// borrows both halves of the key instead of building an owned one.
///
/// Not synchronized; callers wrap it in a lock.
#[derive(Debug)]
pub struct ConversionCache<K> {
    direction: Direction,
    entries: HashMap<K, HashMap<String, Entry>>,
    len: usize,
    lru: LruList<EntryKey<K>>,
    stats: CacheStats,
    capacity: usize,
}

impl<K> ConversionCache<K>
where
    K: Clone + Eq + Hash,
{
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `direction` - Direction this cache serves, used in log output
    /// * `capacity` - Maximum number of entries, at least 1
    pub fn new(direction: Direction, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        info!(%direction, capacity, "Conversion cache created");
        Self {
            direction,
            entries: HashMap::new(),
            len: 0,
            lru: LruList::new(),
            stats: CacheStats::new(capacity),
            capacity,
        }
    }

    // == Lookup ==
    /// Returns the cached output for `(text, options)`.
    ///
    /// A hit marks the entry most recently used; a miss changes nothing but
    /// the miss counter.
    pub fn lookup(&mut self, text: &str, options: &K) -> Option<String> {
        match self.entries.get(options).and_then(|texts| texts.get(text)) {
            Some(entry) => {
                self.lru.touch(entry.slot);
                self.stats.record_hit();
                debug!(direction = %self.direction, "Cache hit");
                Some(entry.output.clone())
            }
            None => {
                self.stats.record_miss();
                debug!(direction = %self.direction, "Cache miss");
                None
            }
        }
    }

    // == Store ==
    /// Inserts or overwrites an entry and marks it most recently used.
    ///
    /// Evicts the least recently used entry when the insert overflows the
    /// capacity.
    pub fn store(&mut self, text: &str, options: K, output: String) {
        if let Some(entry) = self
            .entries
            .get_mut(&options)
            .and_then(|texts| texts.get_mut(text))
        {
            entry.output = output;
            self.lru.touch(entry.slot);
            return;
        }

        let slot = self.lru.push_front(EntryKey {
            text: text.to_string(),
            options: options.clone(),
        });
        self.entries
            .entry(options)
            .or_default()
            .insert(text.to_string(), Entry { output, slot });
        self.len += 1;

        if self.len > self.capacity {
            if let Some(evicted) = self.lru.pop_back() {
                self.remove_entry(&evicted);
                self.stats.record_eviction();
                debug!(direction = %self.direction, "Evicted least recently used entry");
            }
        }
    }

    fn remove_entry(&mut self, key: &EntryKey<K>) {
        if let Some(texts) = self.entries.get_mut(&key.options) {
            if texts.remove(&key.text).is_some() {
                self.len -= 1;
            }
            if texts.is_empty() {
                self.entries.remove(&key.options);
            }
        }
    }

    // == Stats ==
    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len,
            ..self.stats
        }
    }

    // == Clear ==
    /// Drops every entry and zeroes the counters. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
        self.lru.clear();
        self.stats.reset();
        info!(direction = %self.direction, "Conversion cache cleared");
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}
