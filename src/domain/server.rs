use reqwest::Url;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::descriptor::ApiDescriptor;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection identity of one remote backend.
///
/// The engine only ever reads a `Server`; token refreshes come back as
/// actions and the owner applies them with [`Server::set_token`].
#[derive(Debug, Clone)]
pub struct Server {
    pub name: String,
    pub url: Url,
    pub port: Option<u16>,
    pub credentials: Option<Credentials>,
    pub token: Option<String>,
    pub refresh_interval: Duration,
    pub timeout: Duration,
    pub api: Arc<ApiDescriptor>,
}

impl Server {
    pub fn new(name: impl Into<String>, url: Url, api: Arc<ApiDescriptor>) -> Self {
        Self {
            name: name.into(),
            url,
            port: None,
            credentials: None,
            token: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            api,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn username(&self) -> &str {
        self.credentials
            .as_ref()
            .map(|c| c.username.as_str())
            .unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.credentials
            .as_ref()
            .map(|c| c.password.as_str())
            .unwrap_or_default()
    }

    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> Server {
        let url = Url::parse("http://nas.local").unwrap();
        Server::new("home", url, Arc::new(ApiDescriptor::empty("test")))
    }

    #[test]
    fn test_absent_secrets_render_empty() {
        let server = server();
        assert_eq!(server.username(), "");
        assert_eq!(server.password(), "");
        assert_eq!(server.token(), "");
        assert_eq!(server.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_builder_and_token_update() {
        let mut server = server()
            .with_port(9091)
            .with_credentials(Credentials::new("admin", "secret"));
        server.set_token("tok1");

        assert_eq!(server.port, Some(9091));
        assert_eq!(server.username(), "admin");
        assert_eq!(server.password(), "secret");
        assert_eq!(server.token(), "tok1");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("admin", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
