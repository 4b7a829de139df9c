#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::Url;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use fetchlink::descriptor::{ApiDescriptor, DescriptorRegistry};
use fetchlink::domain::{Credentials, Server};
use fetchlink::transport::{Transport, TransportError, WireRequest, WireResponse};

pub const TOKEN_HEADER: &str = "X-Transmission-Session-Id";

/// Transport that answers from a fixed script and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<WireResponse>>,
    requests: Mutex<Vec<WireRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = WireResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<WireRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn sent(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Connect("script exhausted".into()))
    }
}

pub fn json_response(status: u16, body: &str) -> WireResponse {
    WireResponse::new(status, body.to_string()).with_header("Content-Type", "application/json")
}

pub fn transmission() -> Arc<ApiDescriptor> {
    DescriptorRegistry::with_builtins()
        .unwrap()
        .get("transmission")
        .unwrap()
}

pub fn transmission_server() -> Server {
    let url = Url::parse("http://nas.local").unwrap();
    Server::new("home", url, transmission())
        .with_port(9091)
        .with_credentials(Credentials::new("admin", "secret"))
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn body_json(request: &WireRequest) -> serde_json::Value {
    match &request.body {
        fetchlink::transport::WireBody::Json(value) => value.clone(),
        other => panic!("expected JSON body, got {other:?}"),
    }
}

pub const TORRENTS: &str = r#"{
    "result": "success",
    "arguments": {"torrents": [
        {
            "hashString": "abc123", "name": "ubuntu.iso", "status": 4,
            "rateUpload": 10, "rateDownload": 2048,
            "uploadedEver": 100, "downloadedEver": 250, "sizeWhenDone": 1000,
            "eta": -1, "addedDate": 1700000000, "downloadDir": "/data", "isFinished": false
        },
        {
            "hashString": "def456", "name": "debian.iso", "status": 6,
            "rateUpload": 0, "rateDownload": 0,
            "uploadedEver": 5000, "downloadedEver": 1000, "sizeWhenDone": 1000,
            "eta": 0, "addedDate": 1700000100, "downloadDir": "/data", "isFinished": true
        }
    ]}
}"#;
