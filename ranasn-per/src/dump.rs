//! JSON rendering of decoded messages
//!
//! Every value type implements `serde::Serialize` with a protocol-friendly
//! shape: integers as numbers, enumerations by name, octet strings as hex
//! text, bit strings as binary text, choices as single-key objects and
//! protocol IEs as `{ id, criticality, value }` objects.

use ranasn_core::error::{PerError, PerResult};
use serde::Serialize;

/// Render `value` as compact JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> PerResult<String> {
    serde_json::to_string(value).map_err(|e| {
        log::error!("Failed to render value as JSON: {}", e);
        PerError::InvalidValue(format!("json dump: {}", e))
    })
}

/// Render `value` as indented JSON
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> PerResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        log::error!("Failed to render value as JSON: {}", e);
        PerError::InvalidValue(format!("json dump: {}", e))
    })
}
