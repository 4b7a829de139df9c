//! Calling orchestrator for the pipeline.
//!
//! A [`Session`] owns a private snapshot of one server. It applies token
//! updates to that snapshot, follows resend actions, and allows at most one
//! authentication retry per [`Session::run`].

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{Action, Command, Server};
use crate::observability::Metrics;
use crate::pipeline::{self, Outcome, QueryError};
use crate::transport::{self, Transport, WireRequest, WireResponse};

/// Counts a dispatch only when a request actually reaches the transport
struct Counted<'a> {
    inner: &'a dyn Transport,
    metrics: &'a Metrics,
}

#[async_trait]
impl Transport for Counted<'_> {
    async fn send(&self, request: WireRequest) -> transport::Result<WireResponse> {
        self.metrics.query_dispatched();
        self.inner.send(request).await
    }
}

pub struct Session {
    server: Server,
    transport: Arc<dyn Transport>,
    metrics: Arc<Metrics>,
}

impl Session {
    pub fn new(server: Server, transport: Arc<dyn Transport>) -> Self {
        Self {
            server,
            transport,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Run `command` to completion.
    ///
    /// Returns the domain actions for the state owner. `SetToken` actions
    /// are both applied to the session's server and returned so the owner
    /// can persist them; `Resend` actions are consumed here.
    pub async fn run(&mut self, command: Command) -> Result<Vec<Action>, QueryError> {
        let mut pending = command;
        let mut retried = false;
        let mut collected = Vec::new();

        loop {
            let transport = Counted {
                inner: self.transport.as_ref(),
                metrics: &self.metrics,
            };
            let outcome = pipeline::execute_actions(&pending, &self.server, &transport).await;

            let (actions, is_retry) = match outcome {
                Ok(Outcome::Success(actions)) => (actions, false),
                Ok(Outcome::Retry(actions)) => {
                    if retried {
                        warn!(
                            server = %self.server.name,
                            command = %pending,
                            "Authentication retry exhausted"
                        );
                        self.metrics.query_failed();
                        return Err(QueryError::TokenRequestFailed);
                    }
                    retried = true;
                    self.metrics.auth_retry();
                    (actions, true)
                }
                Err(error) => {
                    warn!(server = %self.server.name, command = %pending, %error, "Query failed");
                    self.metrics.query_failed();
                    return Err(error);
                }
            };

            let mut next = None;
            for action in actions {
                match action {
                    Action::SetToken(token) => {
                        self.server.set_token(token.clone());
                        collected.push(Action::SetToken(token));
                    }
                    Action::Resend(command) => next = Some(command),
                    other => collected.push(other),
                }
            }

            match next {
                Some(command) => {
                    info!(server = %self.server.name, command = %command, "Resending");
                    pending = command;
                }
                None if is_retry => {
                    self.metrics.query_failed();
                    return Err(QueryError::TokenRequestFailed);
                }
                None => return Ok(collected),
            }
        }
    }
}
