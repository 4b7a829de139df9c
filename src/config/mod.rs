//! Configuration management for fetchlink
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use fetchlink::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! let registry = config.registry().expect("Failed to load descriptors");
//! let server = config.server(None, &registry).expect("No server");
//! println!("Talking to {} via {}", server.url, server.api.name);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `FETCHLINK__<section>__<key>`
//!
//! Examples:
//! - `FETCHLINK__HTTP__MAX_RESPONSE_BYTES=32MB`
//! - `FETCHLINK__SERVERS__HOME__URL=http://nas.local`
//! - `FETCHLINK__DEFAULT_SERVER=home`
//!
//! Passwords and session tokens are never read from the file. They come from
//! `FETCHLINK_SERVER_<NAME>_PASSWORD` and `FETCHLINK_SERVER_<NAME>_TOKEN`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/fetchlink.toml`.
//! This can be overridden using the `FETCHLINK_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

// Re-export public types
pub use crate::humanize::ByteSize;
pub use models::{Config, DescriptorSettings, HttpSettings, ServerConfig};
pub use sources::{load_secrets, secret_key};
pub use validation::ValidationError;

use crate::descriptor::{DescriptorError, DescriptorRegistry};
use crate::domain::{Credentials, Server};
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Failed to load API descriptors: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Unknown server '{0}'")]
    UnknownServer(String),

    #[error("Several servers configured; pick one with --server or set default_server")]
    AmbiguousServer,
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`FETCHLINK__*`)
    /// 2. TOML file (default: `config/fetchlink.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - A descriptor in `descriptors.dir` is invalid
    /// - Validation fails (bad urls, unknown apis, etc.)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config, &config.registry()?)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Secrets are not read; useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config, &config.registry()?)?;
        Ok(config)
    }

    /// Built-in descriptors plus everything in `descriptors.dir`
    pub fn registry(&self) -> Result<DescriptorRegistry, ConfigError> {
        let mut registry = DescriptorRegistry::with_builtins()?;
        if let Some(dir) = &self.descriptors.dir {
            registry.load_dir(dir)?;
        }
        Ok(registry)
    }

    /// Name of the server to use: the explicit one, then `default_server`,
    /// then the only configured server
    pub fn server_name<'a>(&'a self, requested: Option<&'a str>) -> Result<&'a str, ConfigError> {
        if let Some(name) = requested.or(self.default_server.as_deref()) {
            return Ok(name);
        }

        let mut names = self.servers.keys();
        match (names.next(), names.next()) {
            (Some(only), None) => Ok(only),
            (None, _) => Err(ValidationError::NoServersConfigured.into()),
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousServer),
        }
    }

    /// Build the engine's view of a configured server
    pub fn server(
        &self,
        requested: Option<&str>,
        registry: &DescriptorRegistry,
    ) -> Result<Server, ConfigError> {
        let name = self.server_name(requested)?;
        let settings = self
            .servers
            .get(name)
            .ok_or_else(|| ConfigError::UnknownServer(name.to_string()))?;

        validation::validate_server(name, settings)?;
        let url = Url::parse(&settings.url).map_err(|e| ValidationError::InvalidUrl {
            server: name.to_string(),
            url: settings.url.clone(),
            reason: e.to_string(),
        })?;
        let api = registry.get(&settings.api)?;

        let mut server = Server::new(name, url, api)
            .with_timeout(Duration::from_secs(settings.timeout_secs))
            .with_refresh_interval(Duration::from_secs(settings.refresh_interval_secs));

        if let Some(port) = settings.port {
            server = server.with_port(port);
        }
        if let Some(username) = &settings.username {
            let password = settings.password.clone().unwrap_or_default();
            server = server.with_credentials(Credentials::new(username.clone(), password));
        }
        if let Some(token) = &settings.token {
            server = server.with_token(token.clone());
        }

        Ok(server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Command, CommandKind};
    use crate::resolver::resolve;
    use std::fs;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
[servers.home]
url = "http://nas.local"
port = 9091
api = "transmission"
username = "admin"
    "#;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        fs::write(&config_path, MINIMAL).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.server_name(None).unwrap(), "home");
    }

    #[test]
    fn test_validation_catches_unknown_api() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[servers.home]
url = "http://nas.local"
api = "nonexistent"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::UnknownApi { .. })
        ));
    }

    #[test]
    fn test_server_from_config() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.servers.get_mut("home").unwrap().password = Some("secret".to_string());
        config.servers.get_mut("home").unwrap().token = Some("tok0".to_string());

        let registry = config.registry().unwrap();
        let server = config.server(Some("home"), &registry).unwrap();

        assert_eq!(server.name, "home");
        assert_eq!(server.port, Some(9091));
        assert_eq!(server.username(), "admin");
        assert_eq!(server.password(), "secret");
        assert_eq!(server.token(), "tok0");
        assert_eq!(server.timeout, Duration::from_secs(30));
        assert_eq!(server.api.name, "transmission");
    }

    #[test]
    fn test_server_url_is_joined_with_descriptor_path() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let registry = config.registry().unwrap();
        let server = config.server(None, &registry).unwrap();

        let entry = server.api.entry(CommandKind::Fetch).unwrap();
        let request = resolve(&entry.request, &Command::fetch_all(), &server).unwrap();

        assert_eq!(request.url.as_str(), "http://nas.local:9091/transmission/rpc");
    }

    #[test]
    fn test_server_selection() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        let registry = config.registry().unwrap();

        assert!(matches!(
            config.server(Some("office"), &registry),
            Err(ConfigError::UnknownServer(_))
        ));

        let mut second = config.servers["home"].clone();
        second.url = "https://seedbox.example.com".to_string();
        config.servers.insert("seedbox".to_string(), second);
        assert!(matches!(config.server_name(None), Err(ConfigError::AmbiguousServer)));

        config.default_server = Some("seedbox".to_string());
        let server = config.server(None, &registry).unwrap();
        assert_eq!(server.url.as_str(), "https://seedbox.example.com/");
    }

    #[test]
    fn test_descriptor_dir_extends_registry() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("custom.json"),
            r#"{"name": "custom", "commands": {}}"#,
        )
        .unwrap();

        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.descriptors.dir = Some(temp_dir.path().to_path_buf());

        let registry = config.registry().unwrap();
        assert!(registry.contains("custom"));
        assert!(registry.contains("transmission"));
    }
}
