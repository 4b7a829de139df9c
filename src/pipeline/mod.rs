//! Query Execution Pipeline
//!
//! One command, one invocation:
//!
//! ```text
//! Resolving -> Dispatched -> Erroring | Authenticating | Parsing -> Done
//! ```
//!
//! Error rules are checked before authentication rules, and only the first
//! matching token scheme is honored. Authentication branches never dispatch
//! again themselves; they return [`Outcome::Retry`] and the caller decides.

mod actions;
mod error;

pub use actions::{actions, job_view_models};
pub use error::{QueryError, render_html};

use tracing::{debug, info, warn};

use crate::descriptor::ErrorKind;
use crate::domain::{Action, Command, Server};
use crate::matcher::{self, MatchedFields};
use crate::model;
use crate::resolver;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// Actions that must be applied before the command can succeed
    Retry(Vec<Action>),
}

/// Run `command` against `server` once.
///
/// On success the matched fields are handed to `transform`. A
/// `Login(then: Login(..))` fails with [`QueryError::TokenRequestFailed`]
/// before anything is sent.
pub async fn execute<T, F>(
    command: &Command,
    server: &Server,
    transport: &dyn Transport,
    transform: F,
) -> Result<Outcome<T>, QueryError>
where
    F: FnOnce(&Command, MatchedFields) -> Result<T, QueryError>,
{
    let api = &server.api;

    if command.is_nested_login() {
        warn!(server = %server.name, command = %command, "Nested login rejected");
        return Err(QueryError::TokenRequestFailed);
    }

    let kind = command.kind();
    let entry = api
        .entry(kind)
        .ok_or(QueryError::CommandUnsupported(kind))?;

    debug!(server = %server.name, command = %command, state = "resolving", "Resolving request");
    let request = resolver::resolve(&entry.request, command, server)?;

    debug!(
        server = %server.name,
        command = %command,
        url = %request.url,
        state = "dispatched",
        "Dispatching request"
    );
    let response = transport.send(request).await?;
    let status = response.status;

    if let Some(kind) = api.error_for(status) {
        let detail = render_html(&response.body);
        warn!(server = %server.name, command = %command, status, ?kind, "Request rejected");
        return Err(match kind {
            ErrorKind::Password => QueryError::AuthenticationFailure { detail },
            ErrorKind::Forbidden => QueryError::ResourceForbidden { detail },
        });
    }

    if let Some(scheme) = api.token_scheme_for(status) {
        let fresh = response
            .header(&scheme.header)
            .filter(|token| !token.is_empty());

        let actions = match fresh {
            Some(token) => {
                info!(
                    server = %server.name,
                    command = %command,
                    status,
                    "Session token refreshed"
                );
                vec![
                    Action::SetToken(token.to_string()),
                    Action::Resend(command.clone()),
                ]
            }
            None => {
                info!(server = %server.name, command = %command, status, "Login required");
                vec![Action::Resend(Command::login(command.clone()))]
            }
        };
        return Ok(Outcome::Retry(actions));
    }

    if response.is_error() {
        warn!(server = %server.name, command = %command, status, "Unexpected HTTP status");
        return Err(QueryError::UnexpectedStatus {
            status,
            detail: render_html(&response.body),
        });
    }

    let mut fields = match &entry.response {
        Some(expected) => {
            debug!(
                server = %server.name,
                command = %command,
                state = "parsing",
                "Matching response"
            );
            let value = model::parse(expected.format, &response.body)?;
            matcher::match_response(&value, &expected.body)?
        }
        None => MatchedFields::default(),
    };

    if matches!(command, Command::Login { .. }) && fields.token.is_none() {
        fields.token = api
            .token_schemes()
            .find_map(|scheme| response.header(&scheme.header))
            .filter(|token| !token.is_empty())
            .map(str::to_string);
    }

    debug!(server = %server.name, command = %command, state = "done", "Query complete");
    transform(command, fields).map(Outcome::Success)
}

/// [`execute`] with the default [`actions`] transform
pub async fn execute_actions(
    command: &Command,
    server: &Server,
    transport: &dyn Transport,
) -> Result<Outcome<Vec<Action>>, QueryError> {
    let statuses = &server.api.statuses;
    execute(command, server, transport, |command, fields| {
        Ok(actions(command, fields, statuses))
    })
    .await
}
