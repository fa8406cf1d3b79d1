//! Operation execution
//!
//! Runs a parsed [`Operation`] against its bin and turns the backend's result
//! into a [`Reply`]. Each backend error kind is matched explicitly so the
//! status a client sees depends on both the operation and the failure.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::backend::{Backend, Value};
use crate::dispatch::Operation;
use crate::error::{CacheError, Result, TEXT_PLAIN};
use crate::registry::CacheRegistry;

const GET_MISS_BODY: &str = "404 File not found";
const CONFLICT_BODY: &str = "409 status";
const CLEARED_BODY: &str = "Cache Cleared";

// == Reply ==
/// Status and plain-text body produced for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Bytes,
}

impl Reply {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 with `body`.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Status without a body.
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, Bytes::new())
    }

    fn lines(items: Vec<String>) -> Self {
        Self::ok(items.join("\n"))
    }
}

impl From<CacheError> for Reply {
    fn from(err: CacheError) -> Self {
        Self::new(err.status(), err.to_string())
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, TEXT_PLAIN)], self.body).into_response()
    }
}

// == Counter Direction ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Value written when the key does not exist yet.
    ///
    /// Decrementing an absent key by `delta` stores `1 - delta`, not
    /// `-delta`. Existing clients depend on this.
    fn initial(self, delta: i64) -> i64 {
        match self {
            Direction::Up => delta,
            Direction::Down => 1i64.saturating_sub(delta),
        }
    }

    fn apply(self, current: i64, delta: i64) -> Option<i64> {
        match self {
            Direction::Up => current.checked_add(delta),
            Direction::Down => current.checked_sub(delta),
        }
    }
}

// == Execute ==
/// Resolves the target bin and performs `op` against it.
///
/// Every operation except [`Operation::ListBins`] first makes sure its bin
/// exists, so reads and deletes against an unseen bin create it.
pub async fn execute(registry: &CacheRegistry, op: Operation) -> Reply {
    debug!(operation = op.name(), "dispatching");

    match op {
        Operation::ListBins => Reply::lines(registry.names().await),

        Operation::ListKeys { bin } => match registry.resolve(&bin).await.keys().await {
            Ok(keys) => Reply::lines(keys),
            Err(err) => backend_failure(&bin, "", err),
        },

        Operation::Get { bin, key } => match registry.resolve(&bin).await.get(&key).await {
            Ok(value) => Reply::ok(value.to_bytes()),
            Err(CacheError::NotFound(_)) => Reply::new(StatusCode::NOT_FOUND, GET_MISS_BODY),
            Err(err) => {
                warn!(bin = %bin, key = %key, error = %err, "get failed");
                Reply::new(StatusCode::NOT_FOUND, GET_MISS_BODY)
            }
        },

        Operation::Put {
            bin,
            key,
            body,
            ttl,
        } => {
            let handle = registry.resolve(&bin).await;
            match handle.put(&key, Value::Bytes(body), ttl).await {
                Ok(previous) => Reply::ok(previous.map(|v| v.to_bytes()).unwrap_or_default()),
                Err(err) => backend_failure(&bin, &key, err),
            }
        }

        Operation::PutIfAbsent {
            bin,
            key,
            value,
            ttl,
        } => {
            let handle = registry.resolve(&bin).await;
            match handle.put_if_absent(&key, value, ttl).await {
                Ok(previous) => Reply::ok(previous.map(|v| v.to_bytes()).unwrap_or_default()),
                Err(CacheError::AlreadyPresent(_)) => {
                    Reply::new(StatusCode::CONFLICT, CONFLICT_BODY)
                }
                Err(err) => {
                    // Conditional writes report every failure as a conflict
                    warn!(bin = %bin, key = %key, error = %err, "put_if_absent failed");
                    Reply::new(StatusCode::CONFLICT, CONFLICT_BODY)
                }
            }
        }

        Operation::Increment {
            bin,
            key,
            delta,
            ttl,
        } => counter_reply(registry, &bin, &key, delta, ttl, Direction::Up).await,

        Operation::Decrement {
            bin,
            key,
            delta,
            ttl,
        } => counter_reply(registry, &bin, &key, delta, ttl, Direction::Down).await,

        Operation::Remove { bin, key } => match registry.resolve(&bin).await.remove(&key).await {
            Ok(value) => Reply::ok(value.to_bytes()),
            Err(CacheError::NotFound(_)) => Reply::empty(StatusCode::NOT_FOUND),
            Err(err) => {
                warn!(bin = %bin, key = %key, error = %err, "remove failed");
                Reply::empty(StatusCode::NOT_FOUND)
            }
        },

        Operation::Clear { bin } => match registry.resolve(&bin).await.clear().await {
            Ok(()) => Reply::ok(CLEARED_BODY),
            Err(err) => {
                warn!(bin = %bin, error = %err, "clear failed");
                Reply::empty(StatusCode::BAD_REQUEST)
            }
        },
    }
}

fn backend_failure(bin: &str, key: &str, err: CacheError) -> Reply {
    warn!(bin, key, error = %err, "backend operation failed");
    Reply::from(err)
}

async fn counter_reply(
    registry: &CacheRegistry,
    bin: &str,
    key: &str,
    delta: i64,
    ttl: u64,
    direction: Direction,
) -> Reply {
    let handle = registry.resolve(bin).await;
    match apply_counter(handle.as_ref(), key, delta, ttl, direction).await {
        Ok(value) => Reply::ok(value.to_string()),
        Err(err) => backend_failure(bin, key, err),
    }
}

// == Apply Counter ==
/// Increments or decrements `key` by `delta`.
///
/// The atomic backend operation is tried first. When the key is absent it is
/// created with a conditional write; losing that race to another writer sends
/// the request back to the atomic operation, so concurrent first updates all
/// count. When the stored value is not numeric, the value is read, coerced
/// (non-numeric reads as 0), adjusted and written back. That repair path is
/// NOT atomic: a concurrent writer between the read and the write is
/// overwritten.
async fn apply_counter(
    bin: &dyn Backend,
    key: &str,
    delta: i64,
    ttl: u64,
    direction: Direction,
) -> Result<i64> {
    loop {
        let attempt = match direction {
            Direction::Up => bin.increment(key, delta).await,
            Direction::Down => bin.decrement(key, delta).await,
        };

        match attempt {
            Ok(value) => return Ok(value),
            Err(CacheError::TypeMismatch(_)) => {
                debug!(key, "non-numeric counter, rewriting");
                let current = match bin.get(key).await {
                    Ok(value) => value.coerce_integer(),
                    Err(CacheError::NotFound(_)) => 0,
                    Err(err) => return Err(err),
                };
                let next = direction
                    .apply(current, delta)
                    .ok_or_else(|| CacheError::Backend(format!("counter overflow on {}", key)))?;
                bin.put(key, Value::Integer(next), ttl).await?;
                return Ok(next);
            }
            Err(CacheError::NotFound(_)) => {
                let initial = direction.initial(delta);
                match bin.put_if_absent(key, Value::Integer(initial), ttl).await {
                    Ok(_) => return Ok(initial),
                    Err(CacheError::AlreadyPresent(_)) => {
                        debug!(key, "counter created concurrently, retrying");
                    }
                    Err(err) => return Err(err),
                }
            }
            Err(err) => return Err(err),
        }
    }
}
