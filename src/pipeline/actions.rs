use tracing::debug;

use super::QueryError;
use crate::domain::{Action, Command, FetchScope, JobViewModel, StatusTable};
use crate::matcher::MatchedFields;

/// Default transform: lift matched fields into state actions.
///
/// Order is tokens, destinations, per-job errors, jobs, and for a `Login`
/// the resend of its follow-up command last.
pub fn actions(command: &Command, mut fields: MatchedFields, statuses: &StatusTable) -> Vec<Action> {
    let mut actions = Vec::new();

    if let Some(token) = fields.token.take() {
        actions.push(Action::SetToken(token));
    }
    for destination in std::mem::take(&mut fields.destinations) {
        actions.push(Action::CreateDestination(destination));
    }

    match command {
        Command::Login { then } => actions.push(Action::Resend((**then).clone())),
        Command::Fetch(scope) => {
            let mut jobs = Vec::new();
            for raw in fields.into_jobs() {
                match JobViewModel::new(&raw, statuses) {
                    Ok(job) => jobs.push(job),
                    Err(error) => {
                        debug!(%error, "Job record rejected");
                        actions.push(Action::CreateError(QueryError::from(error).to_display()));
                    }
                }
            }
            actions.push(match scope {
                FetchScope::All => Action::SetJobs(jobs),
                FetchScope::Some(_) => Action::UpdateJobs(jobs),
            });
        }
        _ => {}
    }

    actions
}

/// Strict transform: every matched record must build a [`JobViewModel`]
pub fn job_view_models(
    fields: MatchedFields,
    statuses: &StatusTable,
) -> Result<Vec<JobViewModel>, QueryError> {
    fields
        .into_jobs()
        .iter()
        .map(|raw| JobViewModel::new(raw, statuses).map_err(QueryError::from))
        .collect()
}
