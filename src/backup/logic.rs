// pgbackup/src/backup/logic.rs
use chrono::{DateTime, Local};
use std::fs;

use super::BackupArtifact;
use super::archive::compress_file;
use super::db_dump::dump_database;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::utils::process::ProcessOutput;
use crate::workflow::Services;

const COMPONENT: &str = "backup";

/// Dumps the configured database into a timestamped artifact under the
/// backup directory, then gzips it next to the raw dump.
///
/// Both the raw `.dump` and the `.dump.gz` stay on disk.
pub async fn run_backup_flow(
    config: &AppConfig,
    services: &Services,
    started_at: DateTime<Local>,
) -> Result<BackupArtifact> {
    let journal = services.journal.as_ref();
    let backup_dir = &config.paths.backup_dir;
    let artifact = BackupArtifact::planned(backup_dir, &config.postgres.db, started_at);

    fs::create_dir_all(backup_dir).map_err(|source| AppError::IoWrite {
        path: backup_dir.clone(),
        source,
    })?;

    journal.info(
        COMPONENT,
        &format!(
            "Backing up {} database to {}",
            artifact.database,
            artifact.path.display()
        ),
    );
    let output = dump_database(
        services.runner.as_ref(),
        journal,
        &config.pg_dump,
        &config.postgres.source_target(),
        &artifact.path,
        config.dump_policy,
    )
    .await?;

    if !output.as_ref().is_some_and(ProcessOutput::success) {
        journal.warn(COMPONENT, "Dump did not complete, skipping compression");
        return Ok(artifact);
    }
    journal.info(COMPONENT, "Backup complete");

    journal.info(COMPONENT, &format!("Compressing {}", artifact.path.display()));
    let compressed = compress_file(&artifact.path)?;
    journal.info(
        COMPONENT,
        &format!("Compressed backup written to {}", compressed.display()),
    );

    Ok(artifact.into_compressed(compressed))
}
