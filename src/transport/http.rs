//! reqwest-backed transport

use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::{debug, warn};

use super::{MultipartPart, Result, Transport, TransportError, WireBody, WireRequest, WireResponse};
use crate::template::HttpMethod;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
    pub max_response_bytes: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("fetchlink/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 10,
            max_response_bytes: 16 * 1024 * 1024,
        }
    }
}

pub struct HttpTransport {
    client: Client,
    config: HttpConfig,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn multipart(parts: Vec<MultipartPart>) -> Result<Form> {
        let mut form = Form::new();
        for part in parts {
            form = match part {
                MultipartPart::Text { name, value } => form.text(name, value),
                MultipartPart::File {
                    name,
                    filename,
                    bytes,
                } => {
                    let file = Part::bytes(bytes.to_vec())
                        .file_name(filename)
                        .mime_str(mime::APPLICATION_OCTET_STREAM.as_ref())
                        .map_err(|e| TransportError::Request(e.to_string()))?;
                    form.part(name, file)
                }
            };
        }
        Ok(form)
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_redirect() {
        TransportError::TooManyRedirects
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: WireRequest) -> Result<WireResponse> {
        let url = request.url.to_string();
        debug!(url, method = ?request.method, "Sending request");

        let mut builder = self
            .client
            .request(Self::method(request.method), request.url)
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            WireBody::Empty => builder,
            WireBody::Json(value) => builder.json(&value),
            WireBody::Xml(xml) => builder
                .header(reqwest::header::CONTENT_TYPE, mime::TEXT_XML.as_ref())
                .body(xml),
            WireBody::Form(pairs) => builder.form(&pairs),
            WireBody::Multipart(parts) => builder.multipart(Self::multipart(parts)?),
        };

        let mut response = builder.send().await.map_err(classify)?;

        let limit = self.config.max_response_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            warn!(url, limit, "Response body too large");
            return Err(TransportError::BodyTooLarge { limit });
        }

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            if (body.len() + chunk.len()) as u64 > limit {
                warn!(url, limit, "Response body too large");
                return Err(TransportError::BodyTooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url, status, size = body.len(), "Response received");

        Ok(WireResponse {
            status,
            headers,
            body: body.freeze(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.max_response_bytes, 16 * 1024 * 1024);
        assert!(config.user_agent.starts_with("fetchlink/"));
    }

    #[test]
    fn test_transport_builds_from_defaults() {
        assert!(HttpTransport::new(HttpConfig::default()).is_ok());
    }
}
