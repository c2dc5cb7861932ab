//! Page Cache Module
//!
//! Caches fetched pages for a short window and counts every access per URL.
//!
//! Per URL the cache entry moves UNCACHED -> CACHED on a fetch and back to
//! UNCACHED when its TTL lapses. The check and the populate are separate
//! store operations, so concurrent misses may both fetch.

mod fetcher;

use std::time::Duration;

use tracing::{debug, info};

use crate::error::Result;
use crate::store::KvStore;
use crate::value::{decode_int, decode_utf8};

pub use fetcher::{Fetcher, HttpFetcher};

// == Public Constants ==
/// How long a fetched page stays cached.
pub const DEFAULT_PAGE_TTL: Duration = Duration::from_secs(10);

/// Key holding the cached body of `url`.
pub fn cache_key(url: &str) -> String {
    format!("cache:{url}")
}

/// Key holding the access counter of `url`.
pub fn count_key(url: &str) -> String {
    format!("count:{url}")
}

// == Page Cache ==
/// Wraps a [`Fetcher`] with a TTL-bounded cache and an access counter.
pub struct PageCache<S, F> {
    store: S,
    fetcher: F,
    ttl: Duration,
}

impl<S: KvStore, F: Fetcher> PageCache<S, F> {
    /// Creates a page cache with the default 10 second TTL.
    pub fn new(store: S, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            ttl: DEFAULT_PAGE_TTL,
        }
    }

    /// Overrides the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Get Page ==
    /// Returns the page body, fetching it only when no cached copy is live.
    ///
    /// The access counter is incremented on every call, hit or miss.
    pub async fn get_page(&self, url: &str) -> Result<String> {
        let accesses = self.store.incr(&count_key(url)).await?;

        let key = cache_key(url);
        if let Some(cached) = self.store.get(&key).await? {
            debug!(url, accesses, "page cache hit");
            return decode_utf8(cached);
        }

        let content = self.fetcher.fetch(url).await?;
        self.store.set_ex(&key, content.as_bytes(), self.ttl).await?;
        info!(
            "Cached {} ({} bytes) for {}s",
            url,
            content.len(),
            self.ttl.as_secs_f64()
        );

        Ok(content)
    }

    // == Access Count ==
    /// Number of `get_page` calls recorded for `url`.
    pub async fn access_count(&self, url: &str) -> Result<i64> {
        let raw = self.store.get(&count_key(url)).await?;
        Ok(raw.map(decode_int).transpose()?.unwrap_or(0))
    }

    /// The store handle this cache writes to.
    pub fn store(&self) -> &S {
        &self.store
    }
}
