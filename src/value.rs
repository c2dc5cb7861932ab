//! Stored Value Module
//!
//! Values accepted by [`Cache::store`](crate::cache::Cache::store) and the
//! decoders used by the typed getters.

use serde::Serialize;

use crate::error::{CacheError, Result};

// == Stored Value ==
/// A value that can be written to the store.
///
/// Encoded the way a Redis client encodes command arguments: strings as UTF-8,
/// numbers as their decimal text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoredValue {
    Str(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
}

impl StoredValue {
    // == Encoding ==
    /// Returns the raw bytes written to the store for this value.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            StoredValue::Str(s) => s.as_bytes().to_vec(),
            StoredValue::Bytes(b) => b.clone(),
            StoredValue::Int(i) => i.to_string().into_bytes(),
            // Debug keeps the fractional part ("2.0" rather than "2")
            StoredValue::Float(f) => format!("{f:?}").into_bytes(),
        }
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Str(value)
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Str(value.to_string())
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(value: Vec<u8>) -> Self {
        StoredValue::Bytes(value)
    }
}

impl From<&[u8]> for StoredValue {
    fn from(value: &[u8]) -> Self {
        StoredValue::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for StoredValue {
    fn from(value: &[u8; N]) -> Self {
        StoredValue::Bytes(value.to_vec())
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Int(value)
    }
}

impl From<i32> for StoredValue {
    fn from(value: i32) -> Self {
        StoredValue::Int(i64::from(value))
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        StoredValue::Float(value)
    }
}

// == Decoders ==
/// Decodes raw bytes as a UTF-8 string.
pub fn decode_utf8(raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|e| CacheError::Decode(e.to_string()))
}

/// Decodes raw bytes as a decimal integer.
pub fn decode_int(raw: Vec<u8>) -> Result<i64> {
    let text = decode_utf8(raw)?;
    text.trim()
        .parse()
        .map_err(|e| CacheError::Decode(format!("{text:?} is not an integer: {e}")))
}

/// Decodes raw bytes as a decimal float.
pub fn decode_float(raw: Vec<u8>) -> Result<f64> {
    let text = decode_utf8(raw)?;
    text.trim()
        .parse()
        .map_err(|e| CacheError::Decode(format!("{text:?} is not a float: {e}")))
}
