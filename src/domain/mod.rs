//! Domain values shared by every stage of the engine

mod action;
mod command;
mod job;
mod server;
mod status;

pub use action::{Action, DisplayError};
pub use command::{Command, CommandKind, FetchScope};
pub use job::{Eta, FieldType, FieldValue, JobError, JobRaw, JobViewModel, PresetField};
pub use server::{Credentials, DEFAULT_REFRESH_INTERVAL, DEFAULT_TIMEOUT, Server};
pub use status::{Status, StatusEntry, StatusTable};
