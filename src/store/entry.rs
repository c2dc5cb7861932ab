//! Store Entry Module
//!
//! Defines the structure for individual store entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{CacheError, Result};

// == Entry Value ==
/// The two value kinds a key can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    /// Opaque string value
    Bytes(Vec<u8>),
    /// Ordered list of opaque values
    List(Vec<Vec<u8>>),
}

// == Store Entry ==
/// Represents a single store entry with value and expiry.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored value
    pub value: EntryValue,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry with optional TTL.
    ///
    /// A TTL whose deadline does not fit in a u64 millisecond timestamp
    /// never expires.
    pub fn new(value: EntryValue, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.and_then(expiry_after);
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }

    // == Typed Access ==
    /// Returns the string value, or `WrongType` if the key holds a list.
    pub fn as_bytes(&self, key: &str) -> Result<&[u8]> {
        match &self.value {
            EntryValue::Bytes(bytes) => Ok(bytes),
            EntryValue::List(_) => Err(CacheError::WrongType(key.to_string())),
        }
    }

    /// Returns the list value, or `WrongType` if the key holds a string.
    pub fn as_list(&self, key: &str) -> Result<&[Vec<u8>]> {
        match &self.value {
            EntryValue::List(items) => Ok(items),
            EntryValue::Bytes(_) => Err(CacheError::WrongType(key.to_string())),
        }
    }

    /// Mutable variant of [`as_list`](Self::as_list).
    pub fn as_list_mut(&mut self, key: &str) -> Result<&mut Vec<Vec<u8>>> {
        match &mut self.value {
            EntryValue::List(items) => Ok(items),
            EntryValue::Bytes(_) => Err(CacheError::WrongType(key.to_string())),
        }
    }
}

// == Utility Functions ==
/// Unix millisecond deadline `ttl` from now, or None on overflow.
pub fn expiry_after(ttl: Duration) -> Option<u64> {
    u64::try_from(ttl.as_millis())
        .ok()
        .and_then(|ms| current_timestamp_ms().checked_add(ms))
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn bytes(value: &str) -> EntryValue {
        EntryValue::Bytes(value.as_bytes().to_vec())
    }

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = StoreEntry::new(bytes("test_value"), None);

        assert_eq!(entry.as_bytes("k").unwrap(), b"test_value");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining_ms().is_none());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = StoreEntry::new(bytes("test_value"), Some(Duration::from_millis(100)));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(150));

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining_ms().unwrap(), 0);
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = StoreEntry::new(bytes("page"), Some(Duration::from_secs(10)));

        let remaining_ms = entry.ttl_remaining_ms().unwrap();
        assert!(remaining_ms <= 10_000);
        assert!(remaining_ms >= 9_000);
    }

    #[test]
    fn test_oversized_ttl_never_expires() {
        let entry = StoreEntry::new(bytes("page"), Some(Duration::from_secs(u64::MAX)));

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(expiry_after(Duration::from_millis(u64::MAX)).is_none());
        assert!(expiry_after(Duration::from_secs(10)).is_some());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = StoreEntry {
            value: bytes("test"),
            expires_at: Some(current_timestamp_ms()),
        };

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }

    #[test]
    fn test_wrong_type_access() {
        let mut list = StoreEntry::new(EntryValue::List(vec![b"a".to_vec()]), None);
        assert!(matches!(list.as_bytes("l"), Err(CacheError::WrongType(_))));
        assert_eq!(list.as_list("l").unwrap().len(), 1);
        list.as_list_mut("l").unwrap().push(b"b".to_vec());
        assert_eq!(list.as_list("l").unwrap().len(), 2);

        let string = StoreEntry::new(bytes("v"), None);
        assert!(matches!(string.as_list("s"), Err(CacheError::WrongType(_))));
    }
}
