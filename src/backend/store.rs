//! Bin Store Module
//!
//! Storage for one in-memory bin: a HashMap of entries with LRU tracking and
//! lazy TTL expiration. Not synchronized; [`MemoryBin`](super::MemoryBin)
//! wraps it in a lock.

use std::collections::HashMap;

use crate::backend::{CacheEntry, CacheStats, LruTracker, Value};
use crate::error::{CacheError, Result};

// == Bin Store ==
/// Entries of a single bin with LRU eviction and TTL support.
#[derive(Debug)]
pub struct BinStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl BinStore {
    // == Constructor ==
    /// Creates an empty store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
        }
    }

    // == Expire ==
    /// Drops `key` if its entry has expired. Returns true if it was dropped.
    fn expire(&mut self, key: &str) -> bool {
        let expired = self.entries.get(key).is_some_and(CacheEntry::is_expired);
        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
        }
        expired
    }

    // == Insert ==
    /// Stores an entry, evicting the least recently used one if a new key
    /// would exceed capacity. Returns the replaced value, if any.
    fn insert(&mut self, key: &str, value: Value, ttl: u64) -> Result<Option<Value>> {
        let is_overwrite = self.entries.contains_key(key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted_key) => {
                    self.entries.remove(&evicted_key);
                    self.stats.record_eviction();
                }
                None => {
                    return Err(CacheError::Backend(
                        "bin is full and eviction failed".to_string(),
                    ));
                }
            }
        }

        let previous = self
            .entries
            .insert(key.to_string(), CacheEntry::new(value, ttl))
            .map(|entry| entry.value);
        self.lru.touch(key);
        self.stats.set_total_entries(self.entries.len());

        Ok(previous)
    }

    // == Get ==
    /// Retrieves a live value, recording a hit or a miss.
    pub fn get(&mut self, key: &str) -> Result<Value> {
        self.expire(key);

        match self.entries.get(key) {
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                Ok(value)
            }
            None => {
                self.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Put ==
    /// Writes unconditionally and returns the previous live value.
    pub fn put(&mut self, key: &str, value: Value, ttl: u64) -> Result<Option<Value>> {
        self.expire(key);
        self.insert(key, value, ttl)
    }

    // == Put If Absent ==
    /// Writes only when no live entry exists for `key`.
    pub fn put_if_absent(&mut self, key: &str, value: Value, ttl: u64) -> Result<Option<Value>> {
        self.expire(key);

        if self.entries.contains_key(key) {
            return Err(CacheError::AlreadyPresent(key.to_string()));
        }
        self.insert(key, value, ttl)
    }

    // == Add ==
    /// Adds `delta` to a numeric entry in place, keeping its expiry.
    pub fn add(&mut self, key: &str, delta: i64) -> Result<i64> {
        self.expire(key);

        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;
        let current = entry
            .value
            .as_integer()
            .ok_or_else(|| CacheError::TypeMismatch(key.to_string()))?;
        let next = current
            .checked_add(delta)
            .ok_or_else(|| CacheError::Backend(format!("counter overflow on {}", key)))?;

        entry.value = Value::Integer(next);
        self.lru.touch(key);
        Ok(next)
    }

    // == Remove ==
    /// Removes a live entry and returns its value.
    pub fn remove(&mut self, key: &str) -> Result<Value> {
        self.expire(key);

        let entry = self
            .entries
            .remove(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;
        self.lru.remove(key);
        self.stats.set_total_entries(self.entries.len());
        Ok(entry.value)
    }

    // == Clear ==
    /// Drops every entry. Statistics other than the entry count are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    // == Keys ==
    /// Live keys in lexical order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired_keys.len());
        self.stats.set_total_entries(self.entries.len());
        expired_keys.len()
    }

    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
