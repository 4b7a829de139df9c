use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "FETCHLINK_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/fetchlink.toml";
const ENV_PREFIX: &str = "FETCHLINK";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config, |key| env::var(key).ok());

    Ok(config)
}

/// `FETCHLINK_SERVER_<NAME>_<SUFFIX>` with the name upper-cased and `-`
/// replaced by `_`
pub fn secret_key(server: &str, suffix: &str) -> String {
    let name: String = server
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("{ENV_PREFIX}_SERVER_{name}_{suffix}")
}

/// Fill server passwords and tokens; secrets never come from TOML
pub fn load_secrets(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    for (name, server) in config.servers.iter_mut() {
        if let Some(password) = lookup(&secret_key(name, "PASSWORD")) {
            server.password = Some(password);
        }
        if let Some(token) = lookup(&secret_key(name, "TOKEN")) {
            server.token = Some(token);
        }
    }
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // FETCHLINK__SERVERS__HOME__URL -> servers.home.url
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}
