use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::lossless;

/// Canonical, backend-independent job state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Downloading,
    Seeding,
    Stopped,
    Paused,
    Checking,
    Queued,
    Error,
    Unknown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Downloading => "downloading",
            Status::Seeding => "seeding",
            Status::Stopped => "stopped",
            Status::Paused => "paused",
            Status::Checking => "checking",
            Status::Queued => "queued",
            Status::Error => "error",
            Status::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One row of a descriptor's status table.
///
/// Codes are normalised to strings on load so `4` and `"4"` compare equal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusEntry {
    pub status: Status,
    #[serde(deserialize_with = "lossless::deserialize_strings")]
    pub codes: Vec<String>,
}

/// Ordered raw-code -> [`Status`] mapping; the first entry that lists a code wins
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StatusTable(Vec<StatusEntry>);

impl StatusTable {
    pub fn new(entries: Vec<StatusEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.0
    }

    pub fn status_for(&self, raw: &str) -> Status {
        self.0
            .iter()
            .find(|entry| entry.codes.iter().any(|code| code == raw))
            .map(|entry| entry.status)
            .unwrap_or(Status::Unknown)
    }
}
