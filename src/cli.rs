use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fetchlink")]
#[command(about = "Drive download backends through their API descriptors", long_about = None)]
pub struct Cli {
    /// Configured server to talk to (defaults to `default_server`)
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List jobs (all of them, or only the given ids)
    Fetch(IdsArgs),
    /// Start jobs
    Start(IdsArgs),
    /// Stop jobs
    Stop(IdsArgs),
    /// Pause jobs
    Pause(IdsArgs),
    /// Remove jobs, keeping downloaded data
    Remove(IdsArgs),
    /// Remove jobs together with their data
    DeleteData(IdsArgs),
    /// Add a job from a URI or magnet link
    AddUri(AddUriArgs),
    /// Add a job from a local file
    AddFile(AddFileArgs),
    /// Refresh the job list every refresh interval until interrupted
    Watch,
    /// List the commands the server's API supports
    Commands,
}

#[derive(clap::Args, Debug)]
pub struct IdsArgs {
    /// Job ids
    pub ids: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct AddUriArgs {
    pub uri: String,

    /// Download directory on the server
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AddFileArgs {
    pub path: PathBuf,

    /// Download directory on the server
    #[arg(long)]
    pub location: Option<String>,
}
