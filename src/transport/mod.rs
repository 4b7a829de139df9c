//! Transport collaborator.
//!
//! The engine hands a fully resolved [`WireRequest`] to a [`Transport`] and
//! gets back status, headers and raw body bytes. It never opens connections
//! itself; [`HttpTransport`] is the reqwest-backed implementation used by the
//! binary, tests plug in scripted transports.

mod http;

pub use http::{HttpConfig, HttpTransport};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

use crate::template::HttpMethod;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: u64 },
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[derive(Debug, Clone, PartialEq)]
pub enum MultipartPart {
    Text { name: String, value: String },
    File { name: String, filename: String, bytes: Bytes },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WireBody {
    Empty,
    Json(serde_json::Value),
    /// Serialized XML-RPC `methodCall`
    Xml(String),
    Form(Vec<(String, String)>),
    Multipart(Vec<MultipartPart>),
}

/// A literal request, ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: WireBody,
    pub timeout: Duration,
}

impl WireRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WireResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl WireResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Performs one network exchange
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: WireRequest) -> Result<WireResponse>;
}
