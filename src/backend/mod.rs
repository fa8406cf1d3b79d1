//! Backend Module
//!
//! The capability set every storage engine behind a bin must provide, plus the
//! bundled in-memory engine used by the server binary.
//!
//! Durability, eviction and expiry belong to the engine. The dispatcher only
//! calls these methods and switches on the `CacheError` variant they return.

mod entry;
mod lru;
mod memory;
mod stats;
mod store;
mod value;


use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use memory::{MemoryBackendFactory, MemoryBin, DEFAULT_MAX_ENTRIES};
pub use stats::CacheStats;
pub use store::BinStore;
pub use value::{leading_integer, Value};

// == Backend Trait ==
/// Operations a bin handle supports.
///
/// Implementations must make `increment`, `decrement` and `put_if_absent`
/// atomic per key.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetches a value. Fails with `CacheError::NotFound` when absent.
    async fn get(&self, key: &str) -> Result<Value>;

    /// Writes unconditionally, returning the previous value if there was one.
    async fn put(&self, key: &str, value: Value, ttl: u64) -> Result<Option<Value>>;

    /// Writes only if the key is absent. Fails with
    /// `CacheError::AlreadyPresent` otherwise.
    async fn put_if_absent(&self, key: &str, value: Value, ttl: u64) -> Result<Option<Value>>;

    /// Adds `delta` to a numeric value and returns the result.
    ///
    /// Fails with `CacheError::TypeMismatch` if the stored value is not
    /// numeric and with `CacheError::NotFound` if the key is absent.
    async fn increment(&self, key: &str, delta: i64) -> Result<i64>;

    /// Subtracts `delta`; same failure modes as [`Backend::increment`].
    async fn decrement(&self, key: &str, delta: i64) -> Result<i64>;

    /// Removes a key and returns its value. Fails with
    /// `CacheError::NotFound` when absent.
    async fn remove(&self, key: &str) -> Result<Value>;

    /// Drops every entry in the bin.
    async fn clear(&self) -> Result<()>;

    /// Lists the live keys in the bin.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Drops expired entries and returns how many were removed.
    ///
    /// Engines that enforce expiry on their own keep the default.
    async fn purge_expired(&self) -> usize {
        0
    }
}

// == Backend Factory ==
/// Builds the handle for a newly referenced bin.
pub trait BackendFactory: Send + Sync {
    /// Creates the handle for bin `name` with the engine's default settings.
    fn create(&self, name: &str) -> Arc<dyn Backend>;
}
