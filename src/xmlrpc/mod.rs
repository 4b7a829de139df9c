//! XML-RPC codec: `methodCall` encoding and `methodResponse` parsing

mod encode;
mod parse;
mod value;

pub use encode::MethodCall;
pub use parse::parse_response;
pub use value::XmlRpcValue;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlRpcError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("invalid <{kind}> value '{text}'")]
    InvalidValue { kind: String, text: String },

    #[error("fault {code}: {message}")]
    Fault { code: i64, message: String },
}
