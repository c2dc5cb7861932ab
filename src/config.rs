//! Configuration Module
//!
//! Handles loading the demo configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::page::DEFAULT_PAGE_TTL;

/// Demo configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL; the in-memory store is used when unset
    pub redis_url: Option<String>,
    /// How long fetched pages stay cached
    pub page_ttl: Duration,
    /// Memory store cleanup interval in seconds
    pub cleanup_interval: u64,
    /// Flush the store before the cache is used
    pub flush_on_start: bool,
    /// Page fetched through the page cache, skipped when unset
    pub page_url: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Redis connection URL (default: unset, in-memory store)
    /// - `PAGE_CACHE_TTL` - Page cache TTL in seconds (default: 10)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `FLUSH_ON_START` - Flush the store on startup (default: true)
    /// - `PAGE_URL` - URL to fetch through the page cache (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: non_empty_var("REDIS_URL"),
            page_ttl: env::var("PAGE_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.page_ttl),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
            flush_on_start: env::var("FLUSH_ON_START")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.flush_on_start),
            page_url: non_empty_var("PAGE_URL"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            page_ttl: DEFAULT_PAGE_TTL,
            cleanup_interval: 1,
            flush_on_start: true,
            page_url: None,
        }
    }
}
