//! Key Codec
//!
//! Turns the hierarchical remainder of a request path into a single bin-scoped
//! key string. Segments are joined with [`SEPARATOR`], so `/users/42/name`
//! becomes `users:42:name`.

use crate::error::{CacheError, Result};

/// Separator placed between path segments in a storage key.
pub const SEPARATOR: &str = ":";

// == Normalize ==
/// Joins path segments into a key.
///
/// Fails with [`CacheError::InvalidKey`] if the joined key is empty or
/// contains any whitespace character.
pub fn normalize<S: AsRef<str>>(segments: &[S]) -> Result<String> {
    let key = segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(SEPARATOR);

    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(CacheError::InvalidKey(key));
    }
    Ok(key)
}

// == From Path ==
/// Splits a raw (percent-encoded) key path on `/` and normalizes it.
///
/// Trailing empty segments are dropped, so `a/b/` and `a/b` name the same key,
/// while inner empty segments are kept (`a//b` becomes `a::b`). A segment that
/// does not decode to UTF-8 makes the whole key invalid.
pub fn from_path(path: &str) -> Result<String> {
    let mut segments = path
        .split('/')
        .map(|raw| {
            urlencoding::decode(raw)
                .map(|s| s.into_owned())
                .map_err(|_| CacheError::InvalidKey(path.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }

    normalize(&segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_joins_segments() {
        assert_eq!(normalize(&["users", "42", "name"]).unwrap(), "users:42:name");
        assert_eq!(normalize(&["single"]).unwrap(), "single");
    }

    #[test]
    fn test_normalize_rejects_empty() {
        let empty: [&str; 0] = [];
        assert!(matches!(normalize(&empty), Err(CacheError::InvalidKey(_))));
        assert!(matches!(normalize(&[""]), Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_normalize_rejects_whitespace() {
        assert!(normalize(&["a b"]).is_err());
        assert!(normalize(&["a", "b\tc"]).is_err());
        assert!(normalize(&["line\n"]).is_err());
    }

    #[test]
    fn test_from_path_trailing_slashes() {
        assert_eq!(from_path("a/b").unwrap(), "a:b");
        assert_eq!(from_path("a/b/").unwrap(), "a:b");
        assert_eq!(from_path("a/b//").unwrap(), "a:b");
    }

    #[test]
    fn test_from_path_keeps_inner_empty_segments() {
        assert_eq!(from_path("a//b").unwrap(), "a::b");
        assert_eq!(from_path("/a").unwrap(), ":a");
    }

    #[test]
    fn test_from_path_only_slashes_is_invalid() {
        assert!(from_path("").is_err());
        assert!(from_path("/").is_err());
        assert!(from_path("///").is_err());
    }

    #[test]
    fn test_from_path_decodes_segments() {
        assert_eq!(from_path("caf%C3%A9/x").unwrap(), "café:x");
        // An encoded space still counts as whitespace
        assert!(from_path("a%20b").is_err());
        // Invalid UTF-8 after decoding
        assert!(from_path("%FF").is_err());
    }

    fn segment_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_.+-]{1,16}"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_normalize_is_idempotent(
            segments in prop::collection::vec(segment_strategy(), 1..6)
        ) {
            let key = normalize(&segments).unwrap();
            prop_assert_eq!(normalize(&[key.as_str()]).unwrap(), key.clone());
            prop_assert_eq!(from_path(&key).unwrap(), key);
        }

        #[test]
        fn prop_normalized_key_never_empty_nor_whitespace(path in "[a-z /\t]{0,24}") {
            if let Ok(key) = from_path(&path) {
                prop_assert!(!key.is_empty());
                prop_assert!(!key.chars().any(char::is_whitespace));
            }
        }
    }
}
