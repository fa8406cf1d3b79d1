//! Cache Registry
//!
//! Maps bin names to backend handles. Bins are created on first reference and
//! never removed, so a name always resolves to the same handle for the
//! registry's lifetime.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::backend::{Backend, BackendFactory};

// == Bin Mode ==
/// How request paths address bins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinMode {
    /// The first path segment names the bin
    Multi,
    /// Every request targets one implicit bin with this name
    Single(String),
}

// == Cache Registry ==
/// Process-wide name to handle mapping.
pub struct CacheRegistry {
    mode: BinMode,
    factory: Arc<dyn BackendFactory>,
    bins: RwLock<BTreeMap<String, Arc<dyn Backend>>>,
}

impl CacheRegistry {
    // == Constructors ==
    /// Registry whose bins are named by the request path.
    pub fn multi(factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            mode: BinMode::Multi,
            factory,
            bins: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registry holding one implicit bin, created up front.
    pub fn single(factory: Arc<dyn BackendFactory>, name: impl Into<String>) -> Self {
        let name = name.into();
        let mut bins = BTreeMap::new();
        bins.insert(name.clone(), factory.create(&name));

        Self {
            mode: BinMode::Single(name),
            factory,
            bins: RwLock::new(bins),
        }
    }

    /// Builds a registry for `mode`.
    pub fn with_mode(factory: Arc<dyn BackendFactory>, mode: BinMode) -> Self {
        match mode {
            BinMode::Multi => Self::multi(factory),
            BinMode::Single(name) => Self::single(factory, name),
        }
    }

    pub fn mode(&self) -> &BinMode {
        &self.mode
    }

    // == Resolve ==
    /// Returns the handle for `name`, constructing it on first use.
    ///
    /// The existence check is repeated under the write lock, so concurrent
    /// first accesses to the same name construct exactly one handle.
    pub async fn resolve(&self, name: &str) -> Arc<dyn Backend> {
        if let Some(bin) = self.bins.read().await.get(name) {
            return bin.clone();
        }

        let mut bins = self.bins.write().await;
        if let Some(bin) = bins.get(name) {
            return bin.clone();
        }

        info!(bin = name, "creating cache bin");
        let bin = self.factory.create(name);
        bins.insert(name.to_string(), bin.clone());
        bin
    }

    // == Names ==
    /// Names of every bin referenced so far, in lexical order.
    pub async fn names(&self) -> Vec<String> {
        self.bins.read().await.keys().cloned().collect()
    }

    /// Handles of every bin referenced so far.
    pub async fn bins(&self) -> Vec<Arc<dyn Backend>> {
        self.bins.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackendFactory;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how many handles it has built.
    struct CountingFactory {
        inner: MemoryBackendFactory,
        created: AtomicUsize,
    }

    impl CountingFactory {
        fn new() -> Self {
            Self {
                inner: MemoryBackendFactory::new(100),
                created: AtomicUsize::new(0),
            }
        }
    }

    impl BackendFactory for CountingFactory {
        fn create(&self, name: &str) -> Arc<dyn Backend> {
            self.created.fetch_add(1, Ordering::SeqCst);
            self.inner.create(name)
        }
    }

    #[tokio::test]
    async fn test_resolve_is_lazy_and_stable() {
        let factory = Arc::new(CountingFactory::new());
        let registry = CacheRegistry::multi(factory.clone());

        assert!(registry.names().await.is_empty());
        assert_eq!(factory.created.load(Ordering::SeqCst), 0);

        let first = registry.resolve("users").await;
        let second = registry.resolve("users").await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
        assert_eq!(registry.names().await, vec!["users".to_string()]);
    }

    #[tokio::test]
    async fn test_names_are_sorted() {
        let registry = CacheRegistry::multi(Arc::new(MemoryBackendFactory::default()));

        registry.resolve("zeta").await;
        registry.resolve("alpha").await;
        registry.resolve("mid").await;

        assert_eq!(registry.names().await, vec!["alpha", "mid", "zeta"]);
        assert_eq!(registry.bins().await.len(), 3);
    }

    #[tokio::test]
    async fn test_single_mode_creates_bin_up_front() {
        let factory = Arc::new(CountingFactory::new());
        let registry = CacheRegistry::single(factory.clone(), "default");

        assert_eq!(registry.mode(), &BinMode::Single("default".to_string()));
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);

        registry.resolve("default").await;
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_first_access_constructs_once() {
        let factory = Arc::new(CountingFactory::new());
        let registry = Arc::new(CacheRegistry::multi(factory.clone()));

        let mut handles = Vec::new();
        for _ in 0..64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move { registry.resolve("hot").await }));
        }

        let mut resolved = Vec::new();
        for handle in handles {
            resolved.push(handle.await.unwrap());
        }

        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
        assert!(resolved.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
