//! PostgreSQL Backup/Restore Tool
//!
//! Dumps a database to a gzipped custom-format archive, or recreates a
//! scratch database and restores a dump into it.

// pgbackup/src/main.rs
mod backup;
mod config;
mod errors;
mod restore;
mod utils;
mod workflow;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use config::AppConfig;
use log::{error, info};
use restore::RestoreOptions;
use restore::db_restore::PgProvisioner;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use utils::journal::{Journal, LogJournal};
use utils::process::TokioCommandRunner;
use workflow::{Outcome, Services};

/// Postgres database management
#[derive(Debug, Parser)]
#[command(name = "pgbackup", version)]
struct Cli {
    /// `backup` or `restore`; anything else exits without doing work
    #[arg(long)]
    action: String,

    /// Database configuration file
    #[arg(long, env = "PGBACKUP_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Name of the new restored database (defaults to `<db>_restore`)
    #[arg(long)]
    dest_db: Option<String>,

    /// Inflate `paths.restore_archive` before restoring
    #[arg(long)]
    extract: bool,
}

/// Main entry point for the backup/restore tool
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    match run_app(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(cli: Cli) -> Result<()> {
    let config = AppConfig::load_from_json(&cli.config).with_context(|| {
        format!(
            "Failed to load application configuration from {}",
            cli.config.display()
        )
    })?;

    let journal: Arc<dyn Journal> = Arc::new(LogJournal);
    let services = Services {
        journal: journal.clone(),
        runner: Arc::new(TokioCommandRunner),
        provisioner: Arc::new(PgProvisioner::new(journal)),
    };
    let options = RestoreOptions {
        dest_db: cli.dest_db,
        extract: cli.extract,
    };

    let outcome = workflow::run_action(&config, &services, &cli.action, &options, Local::now())
        .await
        .with_context(|| format!("{} failed", cli.action))?;

    match outcome {
        Outcome::BackedUp(artifact) if artifact.is_complete() => info!(
            "Backup of {} stored at {}",
            artifact.database,
            artifact.path.display()
        ),
        Outcome::BackedUp(artifact) => error!(
            "Backup of {} did not complete, no archive was stored, see pg_dump output above",
            artifact.database
        ),
        Outcome::Restored(report) if report.succeeded() => {
            info!("Restored into database {}", report.database)
        }
        Outcome::Restored(report) => error!(
            "Restore into database {} reported failures, see pg_restore output above",
            report.database
        ),
        Outcome::Skipped(_) => {}
    }
    Ok(())
}
