//! Store Module
//!
//! The key/value store capability consumed by the cache layers, with an
//! in-process backend and a Redis backend.

mod entry;
mod memory;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

// Re-export public types
pub use entry::{EntryValue, StoreEntry};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

// == Key/Value Store Trait ==
/// Key/value store operations used by the instrumented and page caches.
///
/// Each operation is atomic on its own; no operation spans several keys.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Reads a string value, `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes a string value, clearing any previous TTL.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Writes a string value that expires after `ttl`.
    ///
    /// A zero TTL is rejected with `OperationFailed`. A TTL too large to
    /// schedule is written without expiry.
    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Increments the integer stored at `key` (absent counts as 0) and
    /// returns the new value.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Appends to the list at `key` and returns the new length.
    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize>;

    /// Returns the inclusive range `start..=stop` of the list at `key`.
    /// Negative indices count from the end, so `(0, -1)` is the whole list.
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>>;

    /// Removes every key.
    async fn flush_all(&self) -> Result<()>;
}
