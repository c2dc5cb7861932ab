//! Memory Store Module
//!
//! In-process key/value store with string and list values and per-key TTL.
//! Expired entries are dropped lazily on access and in bulk by
//! [`spawn_cleanup_task`](crate::tasks::spawn_cleanup_task).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::{EntryValue, KvStore, StoreEntry};

// == Memory Store ==
/// Thread-safe in-memory store handle.
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoreEntry>>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of entries held, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    // == TTL ==
    /// Returns the remaining TTL of a live key, or None if the key is absent
    /// or has no expiration.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(StoreEntry::ttl_remaining_ms)
            .map(Duration::from_millis)
    }
}

/// Returns the live entry for `key`, dropping it first if it has expired.
fn live_entry<'a>(
    entries: &'a mut HashMap<String, StoreEntry>,
    key: &str,
) -> Option<&'a mut StoreEntry> {
    if entries.get(key).is_some_and(StoreEntry::is_expired) {
        entries.remove(key);
        return None;
    }
    entries.get_mut(key)
}

/// Resolves Redis-style inclusive list bounds against a list length.
fn list_bounds(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[async_trait]
impl KvStore for MemoryStore {
    // == Get ==
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.write().await;
        match live_entry(&mut entries, key) {
            Some(entry) => Ok(Some(entry.as_bytes(key)?.to_vec())),
            None => Ok(None),
        }
    }

    // == Set ==
    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            StoreEntry::new(EntryValue::Bytes(value.to_vec()), None),
        );
        debug!(key, bytes = value.len(), "set");
        Ok(())
    }

    // == Set With Expiry ==
    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(CacheError::OperationFailed(format!(
                "invalid expire time for key {key}"
            )));
        }
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            StoreEntry::new(EntryValue::Bytes(value.to_vec()), Some(ttl)),
        );
        debug!(key, bytes = value.len(), ttl = ?ttl, "set_ex");
        Ok(())
    }

    // == Increment ==
    async fn incr(&self, key: &str) -> Result<i64> {
        let mut entries = self.entries.write().await;

        // An existing counter keeps its expiry
        let (current, expires_at) = match live_entry(&mut entries, key) {
            Some(entry) => {
                let raw = entry.as_bytes(key)?;
                let current = std::str::from_utf8(raw)
                    .ok()
                    .and_then(|text| text.parse::<i64>().ok())
                    .ok_or_else(|| {
                        CacheError::OperationFailed(format!(
                            "value at {key} is not an integer or out of range"
                        ))
                    })?;
                (current, entry.expires_at)
            }
            None => (0, None),
        };

        let next = current.checked_add(1).ok_or_else(|| {
            CacheError::OperationFailed(format!("increment would overflow at {key}"))
        })?;

        entries.insert(
            key.to_string(),
            StoreEntry {
                value: EntryValue::Bytes(next.to_string().into_bytes()),
                expires_at,
            },
        );
        Ok(next)
    }

    // == List Append ==
    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize> {
        let mut entries = self.entries.write().await;
        if live_entry(&mut entries, key).is_none() {
            entries.insert(
                key.to_string(),
                StoreEntry::new(EntryValue::List(Vec::new()), None),
            );
        }

        let entry = entries
            .get_mut(key)
            .ok_or_else(|| CacheError::OperationFailed(format!("list {key} vanished")))?;
        let items = entry.as_list_mut(key)?;
        items.push(value.to_vec());
        Ok(items.len())
    }

    // == List Range ==
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let mut entries = self.entries.write().await;
        let Some(entry) = live_entry(&mut entries, key) else {
            return Ok(Vec::new());
        };

        let items = entry.as_list(key)?;
        Ok(match list_bounds(items.len(), start, stop) {
            Some((from, to)) => items[from..=to].to_vec(),
            None => Vec::new(),
        })
    }

    // == Flush ==
    async fn flush_all(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        debug!(removed, "flushed memory store");
        Ok(())
    }
}
