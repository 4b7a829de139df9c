use thiserror::Error;

use crate::domain::{CommandKind, DisplayError, JobError, PresetField};
use crate::matcher::{ConversionError, MatchError};
use crate::model::ParseError;
use crate::resolver::ResolveError;
use crate::transport::TransportError;

/// Terminal failure of one query
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("authentication failed")]
    AuthenticationFailure { detail: Option<String> },

    #[error("access forbidden")]
    ResourceForbidden { detail: Option<String> },

    #[error("unexpected response structure: {0}")]
    StructuralMismatch(#[from] MatchError),

    #[error("job is missing required field '{0}'")]
    FieldMissing(PresetField),

    #[error("command '{0}' is not supported by this server")]
    CommandUnsupported(CommandKind),

    #[error("could not obtain an authentication token")]
    TokenRequestFailed,

    /// Never produced by the matcher, which drops fields it cannot convert.
    /// Custom transforms that call [`crate::matcher::convert`] themselves
    /// propagate their failures through this variant.
    #[error(transparent)]
    TypeConversion(#[from] ConversionError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("server answered HTTP {status}")]
    UnexpectedStatus { status: u16, detail: Option<String> },
}

impl From<JobError> for QueryError {
    fn from(error: JobError) -> Self {
        match error {
            JobError::FieldMissing(field) => QueryError::FieldMissing(field),
        }
    }
}

impl QueryError {
    pub fn title(&self) -> String {
        let title = match self {
            QueryError::Transport(TransportError::Timeout) => "Request timed out",
            QueryError::Transport(_) => "Connection failed",
            QueryError::AuthenticationFailure { .. } => "Authentication failed",
            QueryError::ResourceForbidden { .. } => "Access forbidden",
            QueryError::StructuralMismatch(_) => "Unexpected response",
            QueryError::FieldMissing(_) => "Incomplete job data",
            QueryError::CommandUnsupported(_) => "Unsupported command",
            QueryError::TokenRequestFailed => "Token request failed",
            QueryError::TypeConversion(_) => "Unreadable value",
            QueryError::Parse(_) => "Unreadable response",
            QueryError::Resolve(_) => "Invalid request",
            QueryError::UnexpectedStatus { status, .. } => return format!("HTTP error {status}"),
        };
        title.to_string()
    }

    /// Rendered server body for HTTP errors, the error message otherwise
    pub fn detail(&self) -> Option<String> {
        match self {
            QueryError::AuthenticationFailure { detail }
            | QueryError::ResourceForbidden { detail }
            | QueryError::UnexpectedStatus { detail, .. } => detail.clone(),
            QueryError::TokenRequestFailed => None,
            other => Some(other.to_string()),
        }
    }

    pub fn to_display(&self) -> DisplayError {
        DisplayError::new(self.title(), self.detail())
    }
}

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Plain-text rendering of an HTML (or plain) error body.
///
/// Tags are stripped, common entities decoded and whitespace collapsed.
/// An empty result is `None`.
pub fn render_html(body: &[u8]) -> Option<String> {
    let raw = String::from_utf8_lossy(body);

    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = ENTITIES
        .iter()
        .fold(text, |acc, (entity, plain)| acc.replace(entity, plain));
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    (!collapsed.is_empty()).then_some(collapsed)
}
