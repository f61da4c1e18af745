//! # Value Tree → JSON
//!
//! Encodes any serializable value tree (a [`Value`] or a [`Model`]) to
//! JSON text. Keys are written in stored order; symbol keys and symbol
//! values are written as plain strings. Non-finite floats have no JSON
//! form and are written as `null`, matching `serde_json`. A map holding the
//! same text under a symbol key and a string key fails with
//! `JsonError::Encode` instead of emitting a duplicated object key.
//!
//! [`Value`]: modelkit_core::Value
//! [`Model`]: modelkit_core::Model

use serde::Serialize;

use crate::error::JsonError;

/// Compact JSON text for `value`.
///
/// # Errors
///
/// Returns `JsonError::Encode` if serialization fails.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, JsonError> {
    serde_json::to_string(value).map_err(JsonError::Encode)
}

/// Indented JSON text for `value`.
///
/// # Errors
///
/// Returns `JsonError::Encode` if serialization fails.
pub fn encode_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, JsonError> {
    serde_json::to_string_pretty(value).map_err(JsonError::Encode)
}
