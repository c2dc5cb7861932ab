//! Instrumentation Wrappers
//!
//! Call counting and call history as wrapper types. A wrapper implements the
//! same [`Method`] trait as the operation it wraps, records its side effect in
//! the store, and delegates.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::store::KvStore;

// == Method Trait ==
/// A named operation whose calls can be instrumented.
#[async_trait]
pub trait Method: Send + Sync {
    /// Argument recorded in the call history
    type Input: Serialize + Send + Sync + 'static;
    /// Result recorded in the call history
    type Output: Serialize + Send + 'static;

    /// Name the counter and history lists are keyed by, e.g. `Cache.store`.
    fn qualified_name(&self) -> &str;

    async fn call(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Key of the list holding a method's recorded inputs.
pub fn inputs_key(method: &str) -> String {
    format!("{method}:inputs")
}

/// Key of the list holding a method's recorded outputs.
pub fn outputs_key(method: &str) -> String {
    format!("{method}:outputs")
}

// == Wrapping Helpers ==
/// Chains wrappers onto a [`Method`], innermost first.
pub trait MethodExt: Method + Sized {
    fn count_calls<S: KvStore>(self, store: S) -> CountCalls<Self, S> {
        CountCalls { inner: self, store }
    }

    fn call_history<S: KvStore>(self, store: S) -> CallHistory<Self, S> {
        CallHistory { inner: self, store }
    }
}

impl<M: Method> MethodExt for M {}

// == Count Calls ==
/// Increments the counter keyed by the method's name, then delegates.
pub struct CountCalls<M, S> {
    inner: M,
    store: S,
}

#[async_trait]
impl<M: Method, S: KvStore> Method for CountCalls<M, S> {
    type Input = M::Input;
    type Output = M::Output;

    fn qualified_name(&self) -> &str {
        self.inner.qualified_name()
    }

    async fn call(&self, input: Self::Input) -> Result<Self::Output> {
        let name = self.inner.qualified_name();
        let calls = self.store.incr(name).await?;
        debug!(method = name, calls, "call counted");
        self.inner.call(input).await
    }
}

// == Call History ==
/// Appends the serialized arguments before delegating and the serialized
/// result after.
///
/// A failed call leaves an input without a matching output.
pub struct CallHistory<M, S> {
    inner: M,
    store: S,
}

#[async_trait]
impl<M: Method, S: KvStore> Method for CallHistory<M, S> {
    type Input = M::Input;
    type Output = M::Output;

    fn qualified_name(&self) -> &str {
        self.inner.qualified_name()
    }

    async fn call(&self, input: Self::Input) -> Result<Self::Output> {
        let name = self.inner.qualified_name();

        let args = serde_json::to_string(&(&input,))?;
        self.store.rpush(&inputs_key(name), args.as_bytes()).await?;

        let output = self.inner.call(input).await?;

        let rendered = render_output(&output)?;
        self.store
            .rpush(&outputs_key(name), rendered.as_bytes())
            .await?;
        debug!(method = name, args = %args, output = %rendered, "call recorded");

        Ok(output)
    }
}

/// Renders a result for the history; strings are kept unquoted.
fn render_output<T: Serialize>(output: &T) -> Result<String> {
    Ok(match serde_json::to_value(output)? {
        Value::String(text) => text,
        other => other.to_string(),
    })
}
