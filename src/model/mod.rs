//! Structured Response Model
//!
//! A domain-free parse tree that unifies JSON and XML-RPC responses so the
//! matcher can walk a single shape:
//!
//! ```text
//! Null | Bool | String | Number(int|double|opaque) | Date | Bytes
//!      | Dictionary[String -> Self] | Array[Self]
//! ```
//!
//! Dictionaries keep the order in which the backend sent their keys.

pub mod lossless;
mod value;

pub use value::{Number, StructuredValue};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::xmlrpc::{self, XmlRpcError};

/// Wire encoding of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseFormat {
    #[default]
    Json,
    XmlRpc,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML-RPC response: {0}")]
    XmlRpc(#[from] XmlRpcError),
}

/// Parse a raw response body into the canonical tree
pub fn parse(format: ResponseFormat, body: &[u8]) -> Result<StructuredValue, ParseError> {
    match format {
        ResponseFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(body)?;
            Ok(StructuredValue::from(value))
        }
        ResponseFormat::XmlRpc => {
            let value = xmlrpc::parse_response(body)?;
            Ok(StructuredValue::from(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_body() {
        let body = br#"{"result":"success","arguments":{"torrents":[{"id":1}]}}"#;
        let value = parse(ResponseFormat::Json, body).unwrap();

        assert_eq!(value.get("result").and_then(|v| v.as_str()), Some("success"));
        assert!(matches!(
            value.get("arguments").and_then(|v| v.get("torrents")),
            Some(StructuredValue::Array(items)) if items.len() == 1
        ));
    }

    #[test]
    fn test_parse_xmlrpc_body() {
        let body = br#"<?xml version="1.0"?>
<methodResponse><params><param><value><array><data>
<value><string>abc</string></value><value><i8>42</i8></value>
</data></array></value></param></params></methodResponse>"#;
        let value = parse(ResponseFormat::XmlRpc, body).unwrap();

        assert_eq!(
            value,
            StructuredValue::Array(vec![
                StructuredValue::String("abc".into()),
                StructuredValue::Number(Number::Int(42)),
            ])
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse(ResponseFormat::Json, b"<html>oops</html>"),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            parse(ResponseFormat::XmlRpc, b"{}"),
            Err(ParseError::XmlRpc(_))
        ));
    }
}
