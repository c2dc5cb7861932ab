//! Cache Module
//!
//! Stores opaque values under generated keys. The `store` operation is wrapped
//! in call counting and call history, and typed getters decode stored bytes.

mod instrument;
mod playback;


use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::store::KvStore;
use crate::value::{decode_float, decode_int, decode_utf8, StoredValue};

// Re-export public types
pub use instrument::{
    inputs_key, outputs_key, CallHistory, CountCalls, Method, MethodExt,
};
pub use playback::{replay, Replay, ReplayedCall};

// == Public Constants ==
/// Qualified name of [`Cache::store`], used for its counter and history keys.
pub const STORE_METHOD: &str = "Cache.store";

// == Store Method ==
/// Writes a value under a fresh UUID v4 key.
pub struct StoreMethod<S> {
    store: S,
}

impl<S> StoreMethod<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: KvStore> Method for StoreMethod<S> {
    type Input = StoredValue;
    type Output = String;

    fn qualified_name(&self) -> &str {
        STORE_METHOD
    }

    async fn call(&self, data: StoredValue) -> Result<String> {
        let key = Uuid::new_v4().to_string();
        self.store.set(&key, &data.to_bytes()).await?;
        debug!(key = %key, "stored value");
        Ok(key)
    }
}

/// [`StoreMethod`] with call history outermost and call counting inside.
pub type InstrumentedStore<S> = CallHistory<CountCalls<StoreMethod<S>, S>, S>;

// == Cache ==
/// Instrumented cache over a key/value store handle.
pub struct Cache<S> {
    store: S,
    store_method: InstrumentedStore<S>,
}

impl<S: KvStore + Clone> Cache<S> {
    // == Constructors ==
    /// Wraps an existing store handle without touching its contents.
    pub fn new(store: S) -> Self {
        let store_method = StoreMethod::new(store.clone())
            .count_calls(store.clone())
            .call_history(store.clone());
        Self {
            store,
            store_method,
        }
    }

    /// Flushes the store, then wraps it.
    pub async fn flushed(store: S) -> Result<Self> {
        store.flush_all().await?;
        Ok(Self::new(store))
    }

    // == Store ==
    /// Stores `data` under a new random key and returns the key.
    pub async fn store(&self, data: impl Into<StoredValue>) -> Result<String> {
        self.store_method.call(data.into()).await
    }

    // == Get ==
    /// Returns the raw bytes stored at `key`, or None if absent.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(key).await
    }

    /// Returns the value at `key` converted by `transform`, or None if absent.
    pub async fn get_with<T, F>(&self, key: &str, transform: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> Result<T>,
    {
        self.store.get(key).await?.map(transform).transpose()
    }

    pub async fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.get_with(key, decode_utf8).await
    }

    pub async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.get_with(key, decode_int).await
    }

    pub async fn get_float(&self, key: &str) -> Result<Option<f64>> {
        self.get_with(key, decode_float).await
    }

    // == Instrumentation ==
    /// Number of recorded calls of `method`, 0 if never called.
    pub async fn call_count(&self, method: &str) -> Result<i64> {
        Ok(self.get_int(method).await?.unwrap_or(0))
    }

    /// Replays the history of [`Cache::store`].
    pub async fn replay_store(&self) -> Result<Replay> {
        replay(&self.store, STORE_METHOD).await
    }

    // == Lifecycle ==
    /// The underlying store handle.
    pub fn store_handle(&self) -> &S {
        &self.store
    }

    /// Drops the instrumentation and returns the store handle.
    pub fn into_inner(self) -> S {
        self.store
    }
}
