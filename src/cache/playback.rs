//! Call History Replay
//!
//! Reads a method's recorded inputs and outputs back and renders them.

use std::fmt;

use crate::cache::instrument::{inputs_key, outputs_key};
use crate::error::Result;
use crate::store::KvStore;

// == Replayed Call ==
/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayedCall {
    /// JSON array of the call's arguments
    pub args: String,
    /// Rendered result
    pub output: String,
}

// == Replay ==
/// The recorded history of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub method: String,
    /// Number of recorded inputs
    pub call_count: usize,
    /// Inputs paired positionally with outputs
    pub calls: Vec<ReplayedCall>,
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} was called {} times:", self.method, self.call_count)?;
        for call in &self.calls {
            writeln!(f, "{}(*{}) -> {}", self.method, call.args, call.output)?;
        }
        Ok(())
    }
}

/// Loads the call history recorded for `method`.
///
/// Entries are zipped by position; a trailing input without an output (a
/// failed call) is counted but not listed.
pub async fn replay<S: KvStore + ?Sized>(store: &S, method: &str) -> Result<Replay> {
    let inputs = store.lrange(&inputs_key(method), 0, -1).await?;
    let outputs = store.lrange(&outputs_key(method), 0, -1).await?;

    let call_count = inputs.len();
    let calls = inputs
        .into_iter()
        .zip(outputs)
        .map(|(args, output)| ReplayedCall {
            args: String::from_utf8_lossy(&args).into_owned(),
            output: String::from_utf8_lossy(&output).into_owned(),
        })
        .collect();

    Ok(Replay {
        method: method.to_string(),
        call_count,
        calls,
    })
}
