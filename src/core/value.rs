// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record value type system.
//!
//! Provides a unified value representation for the typed payloads emitted
//! by the CSV, XML, and binary decoders. All variants are
//! serde-serializable so the publishing layer can hand records to any
//! downstream serializer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to value mapping for one decoded record.
///
/// Ordered map so serialized output is deterministic across runs.
pub type RecordFields = BTreeMap<String, RecordValue>;

/// Unified value type for decoded upload data.
///
/// # Design Principles
///
/// - **Serde support**: all variants are serializable for downstream processing
/// - **Owned types**: uses owned `String` and `Vec<u8>` for clarity
/// - **Decode-focused**: covers the types the decode engines produce,
///   including the canonical floating seconds-since-epoch timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordValue {
    // Boolean
    Bool(bool),

    // Signed integers
    Int(i64),

    // Floating point
    Float(f64),

    // String (UTF-8)
    String(String),

    // Binary data (raw sample buffers, unparsed payloads)
    Bytes(Vec<u8>),

    // Canonical time as floating seconds since the Unix epoch
    Timestamp(f64),

    // Array of values
    Array(Vec<RecordValue>),

    // Nested record
    Struct(RecordFields),

    // Null value for optional fields
    Null,
}

impl RecordValue {
    /// Check if this value is a numeric type.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            RecordValue::Int(_) | RecordValue::Float(_) | RecordValue::Timestamp(_)
        )
    }

    /// Get as f64 if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RecordValue::Int(v) => Some(*v as f64),
            RecordValue::Float(v) | RecordValue::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as i64 if an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RecordValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string slice if a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RecordValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as nested fields if a struct.
    pub fn as_struct(&self) -> Option<&RecordFields> {
        match self {
            RecordValue::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Convert to a plain JSON value.
    ///
    /// Timestamps flatten to numbers and bytes to arrays; struct fields
    /// keep their deterministic order.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RecordValue::Bool(v) => serde_json::Value::from(*v),
            RecordValue::Int(v) => serde_json::Value::from(*v),
            RecordValue::Float(v) | RecordValue::Timestamp(v) => serde_json::Value::from(*v),
            RecordValue::String(v) => serde_json::Value::from(v.clone()),
            RecordValue::Bytes(v) => serde_json::Value::from(v.clone()),
            RecordValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(RecordValue::to_json).collect())
            }
            RecordValue::Struct(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            RecordValue::Null => serde_json::Value::Null,
        }
    }

    /// Type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            RecordValue::Bool(_) => "bool",
            RecordValue::Int(_) => "int",
            RecordValue::Float(_) => "float",
            RecordValue::String(_) => "string",
            RecordValue::Bytes(_) => "bytes",
            RecordValue::Timestamp(_) => "timestamp",
            RecordValue::Array(_) => "array",
            RecordValue::Struct(_) => "struct",
            RecordValue::Null => "null",
        }
    }
}

impl From<bool> for RecordValue {
    fn from(v: bool) -> Self {
        RecordValue::Bool(v)
    }
}

impl From<i64> for RecordValue {
    fn from(v: i64) -> Self {
        RecordValue::Int(v)
    }
}

impl From<i32> for RecordValue {
    fn from(v: i32) -> Self {
        RecordValue::Int(v as i64)
    }
}

impl From<f64> for RecordValue {
    fn from(v: f64) -> Self {
        RecordValue::Float(v)
    }
}

impl From<f32> for RecordValue {
    fn from(v: f32) -> Self {
        RecordValue::Float(v as f64)
    }
}

impl From<&str> for RecordValue {
    fn from(v: &str) -> Self {
        RecordValue::String(v.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(v: String) -> Self {
        RecordValue::String(v)
    }
}

/// Build a struct value from field pairs.
///
/// Convenience for the leaf decoders, which mostly emit flat records.
pub fn record_struct<I, K>(fields: I) -> RecordValue
where
    I: IntoIterator<Item = (K, RecordValue)>,
    K: Into<String>,
{
    RecordValue::Struct(
        fields
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect::<RecordFields>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(RecordValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(RecordValue::Timestamp(1.5).as_f64(), Some(1.5));
        assert_eq!(RecordValue::String("x".into()).as_f64(), None);
    }

    #[test]
    fn test_record_struct_orders_fields() {
        let value = record_struct([
            ("z", RecordValue::Int(1)),
            ("a", RecordValue::Int(2)),
        ]);
        let fields = value.as_struct().unwrap();
        let keys: Vec<_> = fields.keys().collect();
        assert_eq!(keys, ["a", "z"]);
    }

    #[test]
    fn test_serialize_deterministic() {
        let value = record_struct([
            ("b", RecordValue::Float(2.0)),
            ("a", RecordValue::Bool(true)),
        ]);
        let first = serde_json::to_string(&value).unwrap();
        let second = serde_json::to_string(&value).unwrap();
        assert_eq!(first, second);
    }
}
