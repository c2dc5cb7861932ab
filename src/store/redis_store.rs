//! Redis store implementation.
//!
//! Each trait operation maps to a single Redis command, so the per-operation
//! atomicity comes from the server.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::store::entry::current_timestamp_ms;
use crate::store::KvStore;

/// Per-attempt TCP connect timeout.
const CONNECT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound on `connect` as a whole, retries included.
const CONNECT_DEADLINE: Duration = Duration::from_secs(5);

/// Redis store backend using a connection manager for reconnects.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Opens a managed connection.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be
    /// established within a few seconds.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(CONNECT_ATTEMPT_TIMEOUT);

        let conn = tokio::time::timeout(
            CONNECT_DEADLINE,
            ConnectionManager::new_with_config(client, config),
        )
        .await
        .map_err(|_| {
            CacheError::ConnectionFailed(format!(
                "no connection within {}s",
                CONNECT_DEADLINE.as_secs()
            ))
        })??;

        info!("Connected to Redis");
        Ok(Self { conn })
    }
}

/// PSETEX argument for `ttl`.
///
/// Zero is rejected. Returns None when the deadline is past what Redis can
/// store, in which case the value is written without expiry.
fn psetex_millis(key: &str, ttl: Duration) -> Result<Option<u64>> {
    if ttl.is_zero() {
        return Err(CacheError::OperationFailed(format!(
            "invalid expire time for key {key}"
        )));
    }
    let millis = u64::try_from(ttl.as_millis()).ok().filter(|ms| {
        current_timestamp_ms()
            .checked_add(*ms)
            .is_some_and(|deadline| i64::try_from(deadline).is_ok())
    });
    // Sub-millisecond TTLs round up so PSETEX never sees 0
    Ok(millis.map(|ms| ms.max(1)))
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        // PSETEX keeps sub-second TTLs intact
        match psetex_millis(key, ttl)? {
            Some(millis) => {
                conn.pset_ex::<_, _, ()>(key, value, millis).await?;
                debug!(key, ttl_ms = millis, "set_ex");
            }
            None => {
                conn.set::<_, _, ()>(key, value).await?;
                debug!(key, "set_ex TTL out of range, stored without expiry");
            }
        }
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn.clone();
        let count: i64 = conn.incr(key, 1).await?;
        Ok(count)
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize> {
        let mut conn = self.conn.clone();
        let len: usize = conn.rpush(key, value).await?;
        Ok(len)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let items: Vec<Vec<u8>> = conn.lrange(key, start, stop).await?;
        Ok(items)
    }

    async fn flush_all(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        // FLUSHDB only clears the database selected by the connection URL
        let () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        info!("Flushed Redis database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Helper to get Redis URL from environment.
    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// Skip test if Redis not available.
    async fn get_test_store() -> Option<RedisStore> {
        RedisStore::connect(&redis_url()).await.ok()
    }

    /// Generate a unique test key to avoid conflicts.
    fn test_key(suffix: &str) -> String {
        format!("test:kv_memo:{}:{}", Uuid::new_v4(), suffix)
    }

    #[test]
    fn test_psetex_millis_rejects_zero_ttl() {
        let result = psetex_millis("k", Duration::ZERO);
        assert!(matches!(result, Err(CacheError::OperationFailed(_))));
    }

    #[test]
    fn test_psetex_millis_ranges() {
        assert_eq!(psetex_millis("k", Duration::from_secs(10)).unwrap(), Some(10_000));
        assert_eq!(psetex_millis("k", Duration::from_micros(10)).unwrap(), Some(1));
        assert_eq!(psetex_millis("k", Duration::from_secs(u64::MAX)).unwrap(), None);
        assert_eq!(psetex_millis("k", Duration::from_millis(i64::MAX as u64)).unwrap(), None);
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails_fast() {
        let attempt = tokio::time::timeout(
            Duration::from_secs(15),
            RedisStore::connect("redis://127.0.0.1:1"),
        )
        .await;

        match attempt {
            Ok(result) => assert!(matches!(result, Err(CacheError::ConnectionFailed(_)))),
            Err(_) => panic!("connect did not give up within 15s"),
        }
    }

    #[tokio::test]
    async fn test_redis_set_ex_rejects_zero_ttl() {
        let Some(store) = get_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("zero_ttl");
        let result = store.set_ex(&key, b"v", Duration::ZERO).await;

        assert!(matches!(result, Err(CacheError::OperationFailed(_))));
        assert_eq!(store.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_redis_set_ex_oversized_ttl_is_kept() {
        let Some(store) = get_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("huge_ttl");
        store
            .set_ex(&key, b"v", Duration::from_secs(u64::MAX))
            .await
            .unwrap();

        assert_eq!(store.get(&key).await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_redis_set_and_get() {
        let Some(store) = get_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("set_get");
        store.set(&key, b"hello world").await.unwrap();

        let result = store.get(&key).await.unwrap();
        assert_eq!(result, Some(b"hello world".to_vec()));
    }

    #[tokio::test]
    async fn test_redis_get_nonexistent() {
        let Some(store) = get_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let result = store.get(&test_key("nonexistent")).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_redis_set_ex() {
        let Some(store) = get_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("ttl");
        store
            .set_ex(&key, b"expiring value", Duration::from_millis(300))
            .await
            .unwrap();
        assert!(store.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(store.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_incr() {
        let Some(store) = get_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("counter");
        assert_eq!(store.incr(&key).await.unwrap(), 1);
        assert_eq!(store.incr(&key).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_redis_list_ops() {
        let Some(store) = get_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("list");
        assert_eq!(store.rpush(&key, b"a").await.unwrap(), 1);
        assert_eq!(store.rpush(&key, b"b").await.unwrap(), 2);

        let items = store.lrange(&key, 0, -1).await.unwrap();
        assert_eq!(items, vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[tokio::test]
    async fn test_redis_wrong_type() {
        let Some(store) = get_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("wrong_type");
        store.rpush(&key, b"a").await.unwrap();

        let result = store.get(&key).await;
        assert!(matches!(result, Err(CacheError::WrongType(_))));
    }

    #[tokio::test]
    async fn test_redis_binary_data() {
        let Some(store) = get_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("binary");
        let value: Vec<u8> = (0..=255).collect();

        store.set(&key, &value).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(value));
    }
}
