use super::models::{Config, ServerConfig};
use crate::descriptor::DescriptorRegistry;
use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No servers configured (add at least one [servers.<name>] section)")]
    NoServersConfigured,

    #[error("Server '{server}' has an invalid url '{url}': {reason}")]
    InvalidUrl {
        server: String,
        url: String,
        reason: String,
    },

    #[error("Server '{server}' uses unsupported scheme '{scheme}', expected 'http' or 'https'")]
    InvalidScheme { server: String, scheme: String },

    #[error("Server '{server}' has port 0")]
    InvalidPort { server: String },

    #[error("Server '{server}' must have a positive {field}")]
    ZeroInterval { server: String, field: String },

    #[error("default_server '{0}' is not a configured server")]
    UnknownDefaultServer(String),

    #[error("Server '{server}' references unknown api '{api}'")]
    UnknownApi { server: String, api: String },

    #[error("http.max_response_bytes must be positive")]
    ZeroResponseLimit,
}

/// Validate the entire configuration against the known descriptors
pub fn validate(config: &Config, registry: &DescriptorRegistry) -> Result<(), ValidationError> {
    validate_servers(config, registry)?;
    validate_default_server(config)?;
    validate_http(config)?;
    Ok(())
}

fn validate_servers(config: &Config, registry: &DescriptorRegistry) -> Result<(), ValidationError> {
    if config.servers.is_empty() {
        return Err(ValidationError::NoServersConfigured);
    }

    for (name, server) in &config.servers {
        validate_server(name, server)?;

        if !registry.contains(&server.api) {
            return Err(ValidationError::UnknownApi {
                server: name.clone(),
                api: server.api.clone(),
            });
        }
    }

    Ok(())
}

/// Checks that do not need the descriptor registry
pub(super) fn validate_server(name: &str, server: &ServerConfig) -> Result<(), ValidationError> {
    let url = Url::parse(&server.url).map_err(|e| ValidationError::InvalidUrl {
        server: name.to_string(),
        url: server.url.clone(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidScheme {
            server: name.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    if server.port == Some(0) {
        return Err(ValidationError::InvalidPort {
            server: name.to_string(),
        });
    }

    for (field, value) in [
        ("refresh_interval_secs", server.refresh_interval_secs),
        ("timeout_secs", server.timeout_secs),
    ] {
        if value == 0 {
            return Err(ValidationError::ZeroInterval {
                server: name.to_string(),
                field: field.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_default_server(config: &Config) -> Result<(), ValidationError> {
    match &config.default_server {
        Some(name) if !config.servers.contains_key(name) => {
            Err(ValidationError::UnknownDefaultServer(name.clone()))
        }
        _ => Ok(()),
    }
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    if config.http.max_response_bytes.as_u64() == 0 {
        return Err(ValidationError::ZeroResponseLimit);
    }
    Ok(())
}
