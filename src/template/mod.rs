//! Declarative request and response templates.
//!
//! Templates are plain data loaded from API descriptor files. Request
//! templates describe the wire shape of a request with holes
//! ([`RequestParameter`]) for credentials, tokens, uris and job ids;
//! response templates describe the shape a response must have and which
//! leaves to extract ([`ResponseParameter`]).

mod request;
mod response;

pub use request::{
    FileEncoding, FormItem, FormValue, HttpMethod, PayloadTemplate, RequestBody,
    RequestParameter, RequestTemplate, XmlRpcCall,
};
pub use response::{AdHocField, ExpectedValue, FieldSpec, ResponseParameter, ResponseTemplate};
