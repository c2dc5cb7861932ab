//! Page Fetchers
//!
//! The uncached fetch behind [`PageCache`](crate::page::PageCache).

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

/// Retrieves the body of a page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

// == HTTP Fetcher ==
/// Fetches pages with an HTTP GET.
///
/// Non-success status codes are returned as `CacheError::Fetch`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured client (timeouts, proxies, headers).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let status = response.status();
        let body = response.text().await?;
        debug!(url, status = status.as_u16(), bytes = body.len(), "fetched page");
        Ok(body)
    }
}
