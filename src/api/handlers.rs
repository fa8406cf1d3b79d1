//! API Handlers
//!
//! The single HTTP entry point. Every request is classified by the dispatcher
//! rather than by axum route patterns, because counter prefixes, bin-level
//! paths and key paths all overlap.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::backend::{BackendFactory, MemoryBackendFactory};
use crate::config::Config;
use crate::dispatch::{self, Operation};
use crate::registry::CacheRegistry;
use crate::ttl;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Bin name to handle mapping
    pub registry: Arc<CacheRegistry>,
}

impl AppState {
    pub fn new(registry: CacheRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Builds state backed by in-memory bins as described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let factory: Arc<dyn BackendFactory> =
            Arc::new(MemoryBackendFactory::new(config.max_entries));
        Self::new(CacheRegistry::with_mode(factory, config.bin_mode()))
    }
}

/// Handles every request: classify, then execute.
///
/// Classification failures (unmapped path, invalid key) answer 404 before
/// any bin is touched.
pub async fn dispatch_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ttl = ttl::from_headers(&headers);

    match Operation::parse(state.registry.mode(), &method, uri.path(), body, ttl) {
        Ok(op) => dispatch::execute(&state.registry, op).await.into_response(),
        Err(err) => {
            debug!(%method, path = uri.path(), error = %err, "request rejected");
            err.into_response()
        }
    }
}
