use serde::Serialize;
use std::fmt;

use super::command::Command;
use super::job::JobViewModel;

/// Error ready for display: a short title plus optional rendered detail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayError {
    pub title: String,
    pub detail: Option<String>,
}

impl DisplayError {
    pub fn new(title: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            title: title.into(),
            detail,
        }
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.title, detail),
            None => f.write_str(&self.title),
        }
    }
}

/// State change requested by the engine. The state owner applies these;
/// the engine never mutates application state itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetToken(String),
    CreateDestination(String),
    /// Replace the whole job list (answer to `fetch(all)`)
    SetJobs(Vec<JobViewModel>),
    /// Merge into the job list (answer to `fetch(some)`)
    UpdateJobs(Vec<JobViewModel>),
    CreateError(DisplayError),
    Resend(Command),
}
