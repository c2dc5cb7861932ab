//! Integration Tests for the Page Cache
//!
//! Serves pages from a local axum origin and fetches them over HTTP through
//! the page cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use kv_memo::{
    page::{cache_key, count_key},
    CacheError, HttpFetcher, KvStore, MemoryStore, PageCache,
};

// == Helper Functions ==

/// Counts requests served by the origin.
#[derive(Clone, Default)]
struct Origin {
    hits: Arc<AtomicUsize>,
}

impl Origin {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn page_handler(State(origin): State<Origin>) -> String {
    let n = origin.hits.fetch_add(1, Ordering::SeqCst) + 1;
    format!("<html>served {n}</html>")
}

async fn missing_handler(State(origin): State<Origin>) -> StatusCode {
    origin.hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::NOT_FOUND
}

/// Starts the origin on an ephemeral port and returns its base URL.
async fn spawn_origin() -> (String, Origin) {
    let origin = Origin::default();
    let app = Router::new()
        .route("/page", get(page_handler))
        .route("/missing", get(missing_handler))
        .with_state(origin.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), origin)
}

fn fetcher() -> HttpFetcher {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpFetcher::with_client(client)
}

// == Tests ==

#[tokio::test]
async fn test_two_calls_fetch_once() {
    let (base, origin) = spawn_origin().await;
    let url = format!("{base}/page");
    let pages = PageCache::new(MemoryStore::new(), fetcher());

    let first = pages.get_page(&url).await.unwrap();
    let second = pages.get_page(&url).await.unwrap();

    assert_eq!(first, "<html>served 1</html>");
    assert_eq!(second, first);
    assert_eq!(origin.hits(), 1);
    assert_eq!(pages.access_count(&url).await.unwrap(), 2);
}

#[tokio::test]
async fn test_cached_body_is_stored_under_url_key() {
    let (base, _origin) = spawn_origin().await;
    let url = format!("{base}/page");
    let pages = PageCache::new(MemoryStore::new(), fetcher());

    let body = pages.get_page(&url).await.unwrap();

    let cached = pages.store().get(&cache_key(&url)).await.unwrap();
    assert_eq!(cached, Some(body.into_bytes()));
    let count = pages.store().get(&count_key(&url)).await.unwrap();
    assert_eq!(count, Some(b"1".to_vec()));
}

#[tokio::test]
async fn test_expiry_triggers_one_new_fetch() {
    let (base, origin) = spawn_origin().await;
    let url = format!("{base}/page");
    let pages =
        PageCache::new(MemoryStore::new(), fetcher()).with_ttl(Duration::from_millis(300));

    pages.get_page(&url).await.unwrap();
    pages.get_page(&url).await.unwrap();
    assert_eq!(origin.hits(), 1);

    tokio::time::sleep(Duration::from_millis(400)).await;

    let refreshed = pages.get_page(&url).await.unwrap();
    pages.get_page(&url).await.unwrap();

    assert_eq!(refreshed, "<html>served 2</html>");
    assert_eq!(origin.hits(), 2);
    assert_eq!(pages.access_count(&url).await.unwrap(), 4);
}

#[tokio::test]
async fn test_error_status_is_not_cached() {
    let (base, origin) = spawn_origin().await;
    let url = format!("{base}/missing");
    let pages = PageCache::new(MemoryStore::new(), fetcher());

    let first = pages.get_page(&url).await;
    let second = pages.get_page(&url).await;

    assert!(matches!(first, Err(CacheError::Fetch(_))));
    assert!(matches!(second, Err(CacheError::Fetch(_))));
    assert_eq!(origin.hits(), 2);
    assert_eq!(pages.access_count(&url).await.unwrap(), 2);
}
