use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use br_cli::commands::{delete, entry, history, status, watch};
use br_cli::{Cli, Commands, Config};
use br_core::{OwnerId, SystemClock, Tracker};
use br_db::Database;
use chrono::{Local, TimeZone};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Open the database, ensuring the parent directory exists, and load the owner's log.
fn open_tracker(config: &Config) -> Result<Tracker<Database, SystemClock>> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    let db = Database::open(&config.database_path).with_context(|| {
        format!("failed to open {}", config.database_path.display())
    })?;
    let owner = OwnerId::new(config.owner.as_str()).context("invalid owner in configuration")?;

    let mut tracker = Tracker::new(owner, db, SystemClock);
    if let Err(err) = tracker.load() {
        let message = err.user_message();
        return Err(anyhow::Error::new(err).context(message));
    }
    Ok(tracker)
}

fn execute<Tz>(command: Commands, config: &Config, tz: &Tz) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut tracker = open_tracker(config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Status { json } => status::run(&mut out, &tracker, json, tz)?,
        Commands::History { json } => history::run(&mut out, &tracker, json, tz)?,
        Commands::Start { when } => entry::start(&mut out, &mut tracker, &when, tz)?,
        Commands::Add { category, when } => {
            entry::add(&mut out, &mut tracker, category, &when, tz)?;
        }
        Commands::Delete { id } => delete::run(&mut out, &mut tracker, &id)?,
        Commands::Watch { ticks } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            let restarts = runtime.block_on(watch::run(
                &mut out,
                &mut tracker,
                config.tick_interval(),
                ticks,
                shutdown_signal(),
            ))?;
            tracing::debug!(restarts, "watch finished");
        }
    }

    out.flush()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match config.fixed_offset()? {
        Some(offset) => execute(command, &config, &offset),
        None => execute(command, &config, &Local),
    }
}
