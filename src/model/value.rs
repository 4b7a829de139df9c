use bytes::Bytes;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::fmt;

use crate::xmlrpc::XmlRpcValue;

const SUMMARY_CHARS: usize = 96;

/// Numeric leaf. Values that fit neither `i64` nor a finite `f64` keep their
/// textual form.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i64),
    Double(f64),
    Opaque(String),
}

impl Number {
    /// Integer value, if representable without loss
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(n) => Some(*n),
            Number::Double(d) => {
                let in_range = *d >= i64::MIN as f64 && *d <= i64::MAX as f64;
                (d.fract() == 0.0 && in_range).then_some(*d as i64)
            }
            Number::Opaque(text) => text.parse().ok(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Number::Int(n) => Some(*n as f64),
            Number::Double(d) => Some(*d),
            Number::Opaque(text) => text.parse().ok(),
        }
    }

    pub fn is_negative(&self) -> bool {
        self.as_f64().is_some_and(|n| n < 0.0)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{n}"),
            Number::Double(d) => write!(f, "{d}"),
            Number::Opaque(text) => f.write_str(text),
        }
    }
}

impl From<serde_json::Number> for Number {
    fn from(n: serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::Int(i)
        } else if n.is_f64() {
            n.as_f64()
                .map(Number::Double)
                .unwrap_or_else(|| Number::Opaque(n.to_string()))
        } else {
            // u64 above i64::MAX
            Number::Opaque(n.to_string())
        }
    }
}

/// Canonical parse tree of a backend response
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredValue {
    Null,
    Bool(bool),
    String(String),
    Number(Number),
    Date(DateTime<Utc>),
    Bytes(Bytes),
    Dictionary(IndexMap<String, StructuredValue>),
    Array(Vec<StructuredValue>),
}

impl StructuredValue {
    /// Short name of the node kind, used in mismatch diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            StructuredValue::Null => "null",
            StructuredValue::Bool(_) => "bool",
            StructuredValue::String(_) => "string",
            StructuredValue::Number(_) => "number",
            StructuredValue::Date(_) => "date",
            StructuredValue::Bytes(_) => "bytes",
            StructuredValue::Dictionary(_) => "dictionary",
            StructuredValue::Array(_) => "array",
        }
    }

    pub fn get(&self, key: &str) -> Option<&StructuredValue> {
        match self {
            StructuredValue::Dictionary(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StructuredValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Compact rendering, cut off for log lines and error messages
    pub fn summary(&self) -> String {
        let rendered = self.to_string();
        if rendered.chars().count() <= SUMMARY_CHARS {
            return rendered;
        }
        let mut cut: String = rendered.chars().take(SUMMARY_CHARS).collect();
        cut.push('…');
        cut
    }
}

impl fmt::Display for StructuredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuredValue::Null => f.write_str("null"),
            StructuredValue::Bool(b) => write!(f, "{b}"),
            StructuredValue::String(s) => write!(f, "{s:?}"),
            StructuredValue::Number(n) => write!(f, "{n}"),
            StructuredValue::Date(d) => write!(f, "{}", d.to_rfc3339()),
            StructuredValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            StructuredValue::Dictionary(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key:?}:{value}")?;
                }
                f.write_str("}")
            }
            StructuredValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<serde_json::Value> for StructuredValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => StructuredValue::Null,
            Value::Bool(b) => StructuredValue::Bool(b),
            Value::Number(n) => StructuredValue::Number(n.into()),
            Value::String(s) => StructuredValue::String(s),
            Value::Array(items) => {
                StructuredValue::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(map) => StructuredValue::Dictionary(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<XmlRpcValue> for StructuredValue {
    fn from(value: XmlRpcValue) -> Self {
        match value {
            XmlRpcValue::Nil => StructuredValue::Null,
            XmlRpcValue::Bool(b) => StructuredValue::Bool(b),
            XmlRpcValue::Int(n) => StructuredValue::Number(Number::Int(n)),
            XmlRpcValue::Double(d) => StructuredValue::Number(Number::Double(d)),
            XmlRpcValue::String(s) => StructuredValue::String(s),
            XmlRpcValue::DateTime(d) => StructuredValue::Date(d),
            XmlRpcValue::Base64(b) => StructuredValue::Bytes(b),
            XmlRpcValue::Array(items) => {
                StructuredValue::Array(items.into_iter().map(Into::into).collect())
            }
            XmlRpcValue::Struct(members) => StructuredValue::Dictionary(
                members.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}
