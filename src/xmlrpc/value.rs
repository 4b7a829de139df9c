use bytes::Bytes;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// XML-RPC data model, including the common `nil` and `i8` extensions
#[derive(Debug, Clone, PartialEq)]
pub enum XmlRpcValue {
    Nil,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Base64(Bytes),
    Array(Vec<XmlRpcValue>),
    Struct(IndexMap<String, XmlRpcValue>),
}

impl XmlRpcValue {
    pub fn get(&self, member: &str) -> Option<&XmlRpcValue> {
        match self {
            XmlRpcValue::Struct(members) => members.get(member),
            _ => None,
        }
    }
}

impl From<&str> for XmlRpcValue {
    fn from(s: &str) -> Self {
        XmlRpcValue::String(s.to_string())
    }
}

impl From<String> for XmlRpcValue {
    fn from(s: String) -> Self {
        XmlRpcValue::String(s)
    }
}

impl From<i64> for XmlRpcValue {
    fn from(n: i64) -> Self {
        XmlRpcValue::Int(n)
    }
}

impl From<bool> for XmlRpcValue {
    fn from(b: bool) -> Self {
        XmlRpcValue::Bool(b)
    }
}
