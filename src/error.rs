//! Error types for the cache server
//!
//! Every failure a backend or the request parser can produce is one variant of
//! [`CacheError`]. The dispatcher switches on these explicitly; the
//! `IntoResponse` impl only supplies the default status for each kind.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Content type carried by every response.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

// == Cache Error Enum ==
/// Unified error type for the cache server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key path normalized to an empty string or contains whitespace
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Key not present in the bin
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Counter operation against a value that is not numeric
    #[error("Value is not numeric: {0}")]
    TypeMismatch(String),

    /// Conditional write refused because the key already holds a value
    #[error("Key already present: {0}")]
    AlreadyPresent(String),

    /// Generic storage failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// No operation is mapped to this verb and path shape
    #[error("404 Not Found")]
    RouteNotFound,
}

impl CacheError {
    /// Default HTTP status for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            CacheError::InvalidKey(_) | CacheError::NotFound(_) | CacheError::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            CacheError::AlreadyPresent(_) => StatusCode::CONFLICT,
            CacheError::TypeMismatch(_) | CacheError::Backend(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let body = match &self {
            // Invalid keys look exactly like an unmapped path to the client
            CacheError::InvalidKey(_) | CacheError::RouteNotFound => "404 Not Found".to_string(),
            other => other.to_string(),
        };

        (self.status(), [(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            CacheError::InvalidKey(String::new()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CacheError::NotFound("k".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CacheError::AlreadyPresent("k".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CacheError::Backend("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(CacheError::RouteNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_into_response_is_plain_text() {
        let response = CacheError::InvalidKey("a b".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            TEXT_PLAIN
        );
    }
}
