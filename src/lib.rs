//! kv_memo - Instrumentation and page caching over a key/value store
//!
//! Provides a cache that counts and records its `store` calls, and a page
//! cache that serves fetched pages from the store for a short window.

pub mod cache;
pub mod config;
pub mod error;
pub mod page;
pub mod store;
pub mod tasks;
pub mod value;

pub use cache::Cache;
pub use config::Config;
pub use error::{CacheError, Result};
pub use page::{HttpFetcher, PageCache};
pub use store::{KvStore, MemoryStore, RedisStore};
pub use tasks::spawn_cleanup_task;
pub use value::StoredValue;
