//! API Descriptors
//!
//! One descriptor per backend: authentication schemes, HTTP error rules, the
//! job status table and the command table. Descriptors are plain data and
//! every rule list is scanned in declaration order, first match wins.

mod builtin;
mod registry;

pub use builtin::BUILTIN_DESCRIPTORS;
pub use registry::DescriptorRegistry;

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::{CommandKind, StatusTable};
use crate::template::{RequestTemplate, ResponseTemplate};

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read descriptor {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid descriptor {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("descriptor '{name}': {reason}")]
    Invalid { name: String, reason: String },

    #[error("unknown API descriptor '{0}'")]
    NotFound(String),
}

/// Token carried in a request header and refreshed from the response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenScheme {
    pub header: String,
    /// Status the backend answers with when the token is missing or stale
    pub missing_status: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Authentication {
    Basic,
    Token(TokenScheme),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Password,
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRule {
    pub status_codes: Vec<u16>,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandEntry {
    pub request: RequestTemplate,
    #[serde(default)]
    pub response: Option<ResponseTemplate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiDescriptor {
    pub name: String,
    #[serde(default)]
    pub authentication: Vec<Authentication>,
    #[serde(default)]
    pub errors: Vec<ErrorRule>,
    #[serde(default)]
    pub statuses: StatusTable,
    #[serde(default)]
    pub commands: BTreeMap<CommandKind, CommandEntry>,
}

impl ApiDescriptor {
    /// Descriptor that supports nothing
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            authentication: Vec::new(),
            errors: Vec::new(),
            statuses: StatusTable::default(),
            commands: BTreeMap::new(),
        }
    }

    pub fn from_json(origin: &str, json: &str) -> Result<Self, DescriptorError> {
        let descriptor: Self =
            serde_json::from_str(json).map_err(|source| DescriptorError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn with_command(mut self, kind: CommandKind, entry: CommandEntry) -> Self {
        self.commands.insert(kind, entry);
        self
    }

    /// Whether the backend supports `kind` at all
    pub fn available(&self, kind: CommandKind) -> bool {
        self.commands.contains_key(&kind)
    }

    pub fn entry(&self, kind: CommandKind) -> Option<&CommandEntry> {
        self.commands.get(&kind)
    }

    pub fn supported(&self) -> impl Iterator<Item = CommandKind> + '_ {
        self.commands.keys().copied()
    }

    pub fn error_for(&self, status: u16) -> Option<ErrorKind> {
        self.errors
            .iter()
            .find(|rule| rule.status_codes.contains(&status))
            .map(|rule| rule.kind)
    }

    /// First token scheme whose missing-status equals `status`
    pub fn token_scheme_for(&self, status: u16) -> Option<&TokenScheme> {
        self.token_schemes()
            .find(|scheme| scheme.missing_status == status)
    }

    pub fn token_schemes(&self) -> impl Iterator<Item = &TokenScheme> {
        self.authentication.iter().filter_map(|auth| match auth {
            Authentication::Token(scheme) => Some(scheme),
            Authentication::Basic => None,
        })
    }

    pub fn uses_basic(&self) -> bool {
        self.authentication.contains(&Authentication::Basic)
    }

    pub fn validate(&self) -> Result<(), DescriptorError> {
        let invalid = |reason: String| DescriptorError::Invalid {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty".into()));
        }

        for scheme in self.token_schemes() {
            if scheme.header.trim().is_empty() {
                return Err(invalid("token header must not be empty".into()));
            }
            if !(100..=599).contains(&scheme.missing_status) {
                return Err(invalid(format!(
                    "token missing status {} is not an HTTP status",
                    scheme.missing_status
                )));
            }
        }

        for rule in &self.errors {
            if rule.status_codes.is_empty() {
                return Err(invalid(format!("{:?} error rule has no status codes", rule.kind)));
            }
        }

        Ok(())
    }
}
