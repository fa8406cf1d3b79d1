//! Cache Entry Module
//!
//! A stored value together with its expiry deadline.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::backend::Value;

// == Cache Entry ==
/// Represents a single entry in a bin.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry. A TTL of 0 means the entry never expires.
    pub fn new(value: Value, ttl_seconds: u64) -> Self {
        let now = current_timestamp_ms();
        let expires_at =
            (ttl_seconds > 0).then(|| now.saturating_add(ttl_seconds.saturating_mul(1000)));

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_zero_ttl_never_expires() {
        let entry = CacheEntry::new(Value::from("v"), 0);

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_with_ttl() {
        let entry = CacheEntry::new(Value::Integer(1), 10);

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());
        let lifetime = entry.expires_at.unwrap() - entry.created_at;
        assert_eq!(lifetime, 10_000);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(Value::from("v"), 1);

        assert!(!entry.is_expired());
        sleep(Duration::from_millis(1100));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = CacheEntry {
            value: Value::from("test"),
            created_at: now,
            expires_at: Some(now),
        };

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }
}
