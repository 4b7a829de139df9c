use crate::humanize::ByteSize;
use crate::transport::HttpConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub descriptors: DescriptorSettings,
    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,
    /// Server used when none is named explicitly
    pub default_server: Option<String>,
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: ByteSize,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_response_bytes: default_max_response_bytes(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl HttpSettings {
    pub fn to_http_config(&self) -> HttpConfig {
        HttpConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            user_agent: self.user_agent.clone(),
            max_redirects: self.max_redirects,
            max_response_bytes: self.max_response_bytes.as_u64(),
        }
    }
}

fn default_user_agent() -> String {
    HttpConfig::default().user_agent
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_response_bytes() -> ByteSize {
    ByteSize(16 * 1024 * 1024) // 16 MB
}

fn default_max_redirects() -> usize {
    10
}

/// Extra API descriptors loaded next to the built-in ones
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DescriptorSettings {
    pub dir: Option<PathBuf>,
}

/// One remote backend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub url: String,
    pub port: Option<u16>,
    /// Name of the API descriptor, e.g. "transmission"
    pub api: String,
    pub username: Option<String>,
    /// Loaded from environment, never from the config file
    #[serde(skip)]
    pub password: Option<String>,
    /// Loaded from environment, never from the config file
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_refresh_interval_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    30
}
