//! Value types for nameindex
//!
//! This module defines:
//! - Value: Field value of a stored document
//! - Document: Named fields making up one stored record
//!
//! ## Type Rules
//!
//! - No implicit type coercions: `Int(1) != String("1")`
//! - `Bytes` are not `String`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field value stored in a [`Document`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
        }
    }

    /// Get as i64 if this is an Int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as &str if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// A stored record: an ordered map of field name to value
///
/// Documents are schemaless; typed record views (index entries, counters)
/// are built on top by the crates that own them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field, replacing any previous value
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Get a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Get an Int field
    pub fn get_int(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_int)
    }

    /// Get a String field
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Whether `field` is present and equal to `value`
    pub fn matches(&self, field: &str, value: &Value) -> bool {
        self.get(field) == Some(value)
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the document has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_no_coercion() {
        assert_ne!(Value::Int(1), Value::String("1".into()));
        assert_ne!(Value::Bytes(b"a".to_vec()), Value::String("a".into()));
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert_eq!(Value::String("x".into()).as_int(), None);
        assert_eq!(Value::from("john").as_str(), Some("john"));
        assert_eq!(Value::Null.type_name(), "Null");
    }

    #[test]
    fn test_document_fields() {
        let doc = Document::new()
            .with("Id", 7i64)
            .with("KeyName", "john")
            .with("UserIds", "1 2");

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get_int("Id"), Some(7));
        assert_eq!(doc.get_str("KeyName"), Some("john"));
        assert_eq!(doc.get_str("Id"), None);
        assert!(doc.get("Missing").is_none());
    }

    #[test]
    fn test_document_matches_exact_value() {
        let doc = Document::new().with("KeyName", "john");
        assert!(doc.matches("KeyName", &Value::from("john")));
        assert!(!doc.matches("KeyName", &Value::from("jo")));
        assert!(!doc.matches("Other", &Value::from("john")));
    }

    #[test]
    fn test_document_serde_json() {
        let doc = Document::new().with("Count", 2i64);
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
