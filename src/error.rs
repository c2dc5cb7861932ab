//! Error types for the store, cache and page layers
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for every store-backed operation.
///
/// A missing key is never an error; lookups return `Ok(None)` instead.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The store could not be reached
    #[error("Store connection failed: {0}")]
    ConnectionFailed(String),

    /// The store rejected or failed the command
    #[error("Store operation failed: {0}")]
    OperationFailed(String),

    /// The key holds a value of a different kind (string vs. list)
    #[error("Wrong type for key: {0}")]
    WrongType(String),

    /// A stored value could not be decoded by a typed getter
    #[error("Decode error: {0}")]
    Decode(String),

    /// Call arguments or results could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying page fetch failed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
}

// == Redis Error Mapping ==
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
            CacheError::ConnectionFailed(err.to_string())
        } else if err.code() == Some("WRONGTYPE") {
            CacheError::WrongType(err.to_string())
        } else {
            CacheError::OperationFailed(err.to_string())
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
