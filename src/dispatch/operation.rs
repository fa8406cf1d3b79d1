//! Request classification
//!
//! Maps verb, path shape, body and TTL onto one [`Operation`]. Pure: nothing
//! here touches a bin.

use axum::http::Method;
use bytes::Bytes;

use crate::backend::{leading_integer, Value};
use crate::error::{CacheError, Result};
use crate::key;
use crate::registry::BinMode;

/// Path prefix selecting increment.
const INCREMENT_PREFIX: &str = "+/";
/// Path prefix selecting decrement.
const DECREMENT_PREFIX: &str = "-/";

// == Operation ==
/// A fully parsed cache operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// List the names of all bins
    ListBins,
    /// List the keys held in a bin
    ListKeys { bin: String },
    Get { bin: String, key: String },
    Put { bin: String, key: String, body: Bytes, ttl: u64 },
    PutIfAbsent { bin: String, key: String, value: Value, ttl: u64 },
    Increment { bin: String, key: String, delta: i64, ttl: u64 },
    Decrement { bin: String, key: String, delta: i64, ttl: u64 },
    Remove { bin: String, key: String },
    Clear { bin: String },
}

impl Operation {
    // == Parse ==
    /// Classifies a request.
    ///
    /// `path` is the raw URI path, still percent-encoded. In multi-bin mode
    /// its first segment names the bin; in single-bin mode the whole path
    /// after the leading `/` is the key path.
    pub fn parse(
        mode: &BinMode,
        method: &Method,
        path: &str,
        body: Bytes,
        ttl: u64,
    ) -> Result<Self> {
        let rest = path.strip_prefix('/').unwrap_or(path);

        let (bin, key_path) = match mode {
            BinMode::Multi => {
                if rest.is_empty() {
                    return if *method == Method::GET {
                        Ok(Operation::ListBins)
                    } else {
                        Err(CacheError::RouteNotFound)
                    };
                }
                let (raw_bin, key_path) =
                    rest.split_once('/').ok_or(CacheError::RouteNotFound)?;
                (decode_bin(raw_bin)?, key_path)
            }
            BinMode::Single(name) => (name.clone(), rest),
        };

        if key_path.is_empty() {
            return match *method {
                Method::GET => Ok(Operation::ListKeys { bin }),
                Method::DELETE => Ok(Operation::Clear { bin }),
                Method::PUT | Method::POST => Err(CacheError::InvalidKey(String::new())),
                _ => Err(CacheError::RouteNotFound),
            };
        }

        match *method {
            Method::GET => Ok(Operation::Get {
                bin,
                key: key::from_path(key_path)?,
            }),
            Method::PUT => {
                if let Some(counter_path) = key_path.strip_prefix(INCREMENT_PREFIX) {
                    Ok(Operation::Increment {
                        bin,
                        key: key::from_path(counter_path)?,
                        delta: parse_delta(&body),
                        ttl,
                    })
                } else if let Some(counter_path) = key_path.strip_prefix(DECREMENT_PREFIX) {
                    Ok(Operation::Decrement {
                        bin,
                        key: key::from_path(counter_path)?,
                        delta: parse_delta(&body),
                        ttl,
                    })
                } else {
                    Ok(Operation::Put {
                        bin,
                        key: key::from_path(key_path)?,
                        body,
                        ttl,
                    })
                }
            }
            Method::POST => Ok(Operation::PutIfAbsent {
                bin,
                key: key::from_path(key_path)?,
                value: Value::from_body(body),
                ttl,
            }),
            Method::DELETE => Ok(Operation::Remove {
                bin,
                key: key::from_path(key_path)?,
            }),
            _ => Err(CacheError::RouteNotFound),
        }
    }

    /// Short label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListBins => "list_bins",
            Operation::ListKeys { .. } => "list_keys",
            Operation::Get { .. } => "get",
            Operation::Put { .. } => "put",
            Operation::PutIfAbsent { .. } => "put_if_absent",
            Operation::Increment { .. } => "increment",
            Operation::Decrement { .. } => "decrement",
            Operation::Remove { .. } => "remove",
            Operation::Clear { .. } => "clear",
        }
    }
}

/// Decodes the bin segment. Empty or undecodable names match no route.
fn decode_bin(raw: &str) -> Result<String> {
    let name = urlencoding::decode(raw).map_err(|_| CacheError::RouteNotFound)?;
    if name.is_empty() {
        return Err(CacheError::RouteNotFound);
    }
    Ok(name.into_owned())
}

// == Parse Delta ==
/// Reads a counter delta from the body. Anything below 1 becomes 1.
pub fn parse_delta(body: &[u8]) -> i64 {
    leading_integer(body).max(1)
}
