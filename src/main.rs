//! kv_memo demo
//!
//! Exercises the instrumented cache and, when `PAGE_URL` is set, the page
//! cache against Redis or the in-memory store.

use anyhow::{ensure, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kv_memo::{
    spawn_cleanup_task, Cache, Config, HttpFetcher, KvStore, MemoryStore, PageCache, RedisStore,
    StoredValue,
};

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to Redis, or create the memory store and its cleanup task
/// 4. Run the cache walkthrough and print the call replay
/// 5. Fetch `PAGE_URL` twice through the page cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kv_memo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={}, page_ttl={}s, cleanup_interval={}s, flush_on_start={}",
        if config.redis_url.is_some() { "redis" } else { "memory" },
        config.page_ttl.as_secs(),
        config.cleanup_interval,
        config.flush_on_start
    );

    match config.redis_url.as_deref() {
        Some(url) => {
            let store = RedisStore::connect(url)
                .await
                .context("connecting to Redis")?;
            run(store, &config).await?;
        }
        None => {
            let store = MemoryStore::new();
            let cleanup_handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);
            let result = run(store, &config).await;
            cleanup_handle.abort();
            result?;
        }
    }

    info!("Demo complete");
    Ok(())
}

async fn run<S: KvStore + Clone>(store: S, config: &Config) -> anyhow::Result<()> {
    let cache = if config.flush_on_start {
        Cache::flushed(store).await?
    } else {
        Cache::new(store)
    };

    // Raw, int and str round trips
    let cases = [
        StoredValue::from(b"foo"),
        StoredValue::from(123_i64),
        StoredValue::from("bar"),
    ];
    for value in cases {
        let key = cache.store(value.clone()).await?;
        let matches = match &value {
            StoredValue::Int(expected) => cache.get_int(&key).await? == Some(*expected),
            StoredValue::Str(expected) => cache.get_str(&key).await?.as_ref() == Some(expected),
            other => cache.get(&key).await? == Some(other.to_bytes()),
        };
        ensure!(matches, "round trip failed for {value:?}");
        println!("{matches}");
    }

    let k0 = cache.store(24_i64).await?;
    println!("{}", cache.get_int(&k0).await? == Some(24));

    let k1 = cache.store("24").await?;
    println!("{}", cache.get_str(&k1).await?.as_deref() == Some("24"));

    print!("{}", cache.replay_store().await?);

    if let Some(url) = config.page_url.as_deref() {
        let pages = PageCache::new(cache.store_handle().clone(), HttpFetcher::new())
            .with_ttl(config.page_ttl);
        for _ in 0..2 {
            let body = pages
                .get_page(url)
                .await
                .with_context(|| format!("fetching {url}"))?;
            info!("Fetched {} ({} bytes)", url, body.len());
        }
        info!("{} accessed {} times", url, pages.access_count(url).await?);
    }

    Ok(())
}
