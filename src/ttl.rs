//! TTL Resolver
//!
//! Derives an entry's time-to-live from the request's `Cache-Control` header.

use axum::http::{header, HeaderMap};

use crate::backend::leading_integer;

/// TTL used when no usable header is present. Zero means never expire.
pub const DEFAULT_TTL: u64 = 0;

// == Resolve ==
/// Resolves a TTL in seconds from a `Cache-Control` value.
///
/// Only a value whose first `=`-delimited token is exactly `max-age` is
/// honoured; the number after the last `=` is read leniently, so
/// `max-age=120, public` gives 120 and `max-age=soon` gives 0. Negative
/// numbers clamp to 0. Never fails.
pub fn resolve(header_value: Option<&str>) -> u64 {
    let Some(control) = header_value else {
        return DEFAULT_TTL;
    };

    let first = control.split('=').next().unwrap_or_default();
    if first != "max-age" {
        return DEFAULT_TTL;
    }

    let last = control.rsplit('=').next().unwrap_or_default();
    leading_integer(last.as_bytes()).max(0) as u64
}

/// Reads the `Cache-Control` header from a request and resolves it.
///
/// Non-ASCII header values are treated as absent.
pub fn from_headers(headers: &HeaderMap) -> u64 {
    resolve(
        headers
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_missing_header_defaults() {
        assert_eq!(resolve(None), DEFAULT_TTL);
    }

    #[test]
    fn test_max_age() {
        assert_eq!(resolve(Some("max-age=120")), 120);
        assert_eq!(resolve(Some("max-age=0")), 0);
        assert_eq!(resolve(Some("max-age=120, public")), 120);
    }

    #[test]
    fn test_key_match_is_case_sensitive() {
        assert_eq!(resolve(Some("Max-Age=120")), 0);
        assert_eq!(resolve(Some("no-cache")), 0);
        assert_eq!(resolve(Some("public, max-age=60")), 0);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        assert_eq!(resolve(Some("max-age")), 0);
        assert_eq!(resolve(Some("max-age=")), 0);
        assert_eq!(resolve(Some("max-age=soon")), 0);
        assert_eq!(resolve(Some("max-age=-30")), 0);
        assert_eq!(resolve(Some("")), 0);
    }

    #[test]
    fn test_uses_last_token() {
        assert_eq!(resolve(Some("max-age=10=20")), 20);
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(from_headers(&headers), 0);

        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=45"));
        assert_eq!(from_headers(&headers), 45);
    }
}
