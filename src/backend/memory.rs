//! In-memory backend
//!
//! [`MemoryBin`] puts a [`BinStore`] behind a `tokio` `RwLock` and exposes it
//! through the [`Backend`] trait. Every mutating call holds the write lock for
//! its whole read-modify-write, which is what makes counters and conditional
//! writes atomic.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::{Backend, BackendFactory, BinStore, Value};
use crate::error::{CacheError, Result};

/// Default per-bin capacity.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

// == Memory Bin ==
/// A bin held entirely in process memory.
#[derive(Debug)]
pub struct MemoryBin {
    name: String,
    store: RwLock<BinStore>,
}

impl MemoryBin {
    pub fn new(name: impl Into<String>, max_entries: usize) -> Self {
        Self {
            name: name.into(),
            store: RwLock::new(BinStore::new(max_entries)),
        }
    }
}

#[async_trait]
impl Backend for MemoryBin {
    async fn get(&self, key: &str) -> Result<Value> {
        // Write lock: reads touch the LRU order and may drop expired entries
        self.store.write().await.get(key)
    }

    async fn put(&self, key: &str, value: Value, ttl: u64) -> Result<Option<Value>> {
        self.store.write().await.put(key, value, ttl)
    }

    async fn put_if_absent(&self, key: &str, value: Value, ttl: u64) -> Result<Option<Value>> {
        self.store.write().await.put_if_absent(key, value, ttl)
    }

    async fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        self.store.write().await.add(key, delta)
    }

    async fn decrement(&self, key: &str, delta: i64) -> Result<i64> {
        let negated = delta
            .checked_neg()
            .ok_or_else(|| CacheError::Backend(format!("delta out of range: {}", delta)))?;
        self.store.write().await.add(key, negated)
    }

    async fn remove(&self, key: &str) -> Result<Value> {
        self.store.write().await.remove(key)
    }

    async fn clear(&self) -> Result<()> {
        self.store.write().await.clear();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.read().await.keys())
    }

    async fn purge_expired(&self) -> usize {
        let (removed, stats) = {
            let mut store = self.store.write().await;
            (store.cleanup_expired(), store.stats())
        };

        if removed > 0 {
            debug!(
                bin = %self.name,
                removed,
                entries = stats.total_entries,
                hit_rate = stats.hit_rate(),
                "purged expired entries"
            );
        }
        removed
    }
}

// == Memory Backend Factory ==
/// Builds a [`MemoryBin`] for every newly referenced bin name.
#[derive(Debug, Clone)]
pub struct MemoryBackendFactory {
    max_entries: usize,
}

impl MemoryBackendFactory {
    pub fn new(max_entries: usize) -> Self {
        Self { max_entries }
    }
}

impl Default for MemoryBackendFactory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl BackendFactory for MemoryBackendFactory {
    fn create(&self, name: &str) -> Arc<dyn Backend> {
        Arc::new(MemoryBin::new(name, self.max_entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_through_trait() {
        let bin: Arc<dyn Backend> = MemoryBackendFactory::default().create("users");

        assert_eq!(bin.put("a", Value::from("1"), 0).await.unwrap(), None);
        assert_eq!(bin.get("a").await.unwrap(), Value::from("1"));
        assert_eq!(bin.keys().await.unwrap(), vec!["a".to_string()]);
        assert_eq!(bin.remove("a").await.unwrap(), Value::from("1"));
        assert!(matches!(bin.get("a").await, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_counters() {
        let bin = MemoryBin::new("counters", 100);

        assert!(matches!(
            bin.increment("n", 1).await,
            Err(CacheError::NotFound(_))
        ));
        bin.put("n", Value::Integer(10), 0).await.unwrap();
        assert_eq!(bin.increment("n", 5).await.unwrap(), 15);
        assert_eq!(bin.decrement("n", 20).await.unwrap(), -5);

        bin.put("s", Value::from("abc"), 0).await.unwrap();
        assert!(matches!(
            bin.decrement("s", 1).await,
            Err(CacheError::TypeMismatch(_))
        ));
    }

    #[tokio::test]
    async fn test_decrement_rejects_unrepresentable_delta() {
        let bin = MemoryBin::new("counters", 100);
        bin.put("n", Value::Integer(0), 0).await.unwrap();

        assert!(matches!(
            bin.decrement("n", i64::MIN).await,
            Err(CacheError::Backend(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_atomic() {
        let bin = Arc::new(MemoryBin::new("counters", 100));
        bin.put("hits", Value::Integer(0), 0).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let bin = bin.clone();
            handles.push(tokio::spawn(async move {
                bin.increment("hits", 2).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(bin.get("hits").await.unwrap(), Value::Integer(100));
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let bin = MemoryBin::new("b", 100);

        bin.put("x", Value::from("1"), 0).await.unwrap();
        bin.get("x").await.unwrap();
        bin.clear().await.unwrap();

        assert!(bin.keys().await.unwrap().is_empty());
        let stats = bin.store.read().await.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let bin = MemoryBin::new("b", 100);
        bin.put("short", Value::from("v"), 1).await.unwrap();
        bin.put("forever", Value::from("v"), 0).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        assert_eq!(bin.purge_expired().await, 1);
        assert_eq!(bin.keys().await.unwrap(), vec!["forever".to_string()]);
    }
}
