use bytes::Bytes;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use fetchlink::config::Config;
use fetchlink::domain::{Action, Command, CommandKind, FetchScope, JobViewModel, Server};
use fetchlink::humanize::{ByteSize, format_eta, format_speed};
use fetchlink::session::Session;
use fetchlink::transport::HttpTransport;

use crate::cli::{Cli, Commands};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(cli: Cli) -> Result<(), AnyError> {
    let config = Config::load()?;
    let registry = config.registry()?;
    let server = config.server(cli.server.as_deref(), &registry)?;
    let transport = HttpTransport::new(config.http.to_http_config())?;

    info!(server = %server.name, api = %server.api.name, url = %server.url, "Using server");
    let mut session = Session::new(server, Arc::new(transport));

    let command = match cli.command {
        Commands::Commands => {
            print_commands(session.server());
            return Ok(());
        }
        Commands::Watch => return watch(&mut session).await,
        Commands::Fetch(args) if args.ids.is_empty() => Command::fetch_all(),
        Commands::Fetch(args) => Command::Fetch(FetchScope::Some(args.ids)),
        Commands::Start(args) => Command::Start(args.ids),
        Commands::Stop(args) => Command::Stop(args.ids),
        Commands::Pause(args) => Command::Pause(args.ids),
        Commands::Remove(args) => Command::Remove(args.ids),
        Commands::DeleteData(args) => Command::DeleteData(args.ids),
        Commands::AddUri(args) => Command::AddUri {
            uri: args.uri,
            location: args.location,
        },
        Commands::AddFile(args) => {
            let bytes = tokio::fs::read(&args.path).await?;
            debug!(path = %args.path.display(), len = bytes.len(), "Read job file");
            Command::AddFile {
                bytes: Bytes::from(bytes),
                location: args.location,
            }
        }
    };

    let actions = session.run(command).await?;
    report(&actions);

    let metrics = session.metrics().snapshot();
    debug!(
        dispatched = metrics.queries_dispatched,
        auth_retries = metrics.auth_retries,
        "Session finished"
    );
    Ok(())
}

async fn watch(session: &mut Session) -> Result<(), AnyError> {
    let mut ticker = tokio::time::interval(session.server().refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match session.run(Command::fetch_all()).await {
                    Ok(actions) => report(&actions),
                    Err(error) => warn!(server = %session.server().name, %error, "Refresh failed"),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    let metrics = session.metrics().snapshot();
    info!(
        dispatched = metrics.queries_dispatched,
        auth_retries = metrics.auth_retries,
        failed = metrics.queries_failed,
        "Watch stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn print_commands(server: &Server) {
    for kind in CommandKind::ALL {
        if kind == CommandKind::Login {
            continue;
        }
        let mark = if server.api.available(kind) { "yes" } else { "no" };
        println!("{:<12} {mark}", kind.as_str());
    }
}

fn report(actions: &[Action]) {
    if actions.is_empty() {
        println!("ok");
    }

    for action in actions {
        match action {
            Action::SetToken(_) => debug!("Session token updated"),
            Action::CreateDestination(dir) => println!("destination: {dir}"),
            Action::SetJobs(jobs) | Action::UpdateJobs(jobs) => print_jobs(jobs),
            Action::CreateError(error) => eprintln!("error: {error}"),
            Action::Resend(command) => debug!(%command, "Unfollowed resend"),
        }
    }
}

fn print_jobs(jobs: &[JobViewModel]) {
    println!(
        "{:<42} {:<12} {:>6} {:>10} {:>10} {:>10} {:>8}  NAME",
        "ID", "STATUS", "DONE", "SIZE", "DOWN", "UP", "ETA"
    );
    for job in jobs {
        println!(
            "{:<42} {:<12} {:>5.1}% {:>10} {:>10} {:>10} {:>8}  {}",
            job.id,
            job.status.to_string(),
            job.progress * 100.0,
            ByteSize(job.size).to_string(),
            format_speed(job.download_speed),
            format_speed(job.upload_speed),
            format_eta(job.eta),
            job.name
        );
    }
}
