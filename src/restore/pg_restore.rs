// pgbackup/src/restore/pg_restore.rs
use std::path::Path;

use crate::errors::Result;
use crate::utils::connection::ConnectionTarget;
use crate::utils::journal::Journal;
use crate::utils::process::{CommandRunner, ExternalTool, FailurePolicy, ProcessOutput, run_tool};

/// Arguments for a verbose `pg_restore` of `backup_file` into `target`,
/// leaving object ownership to the connecting role.
pub fn restore_args(target: &ConnectionTarget, backup_file: &Path) -> Result<Vec<String>> {
    Ok(vec![
        "--no-owner".to_string(),
        format!("--dbname={}", target.uri()?),
        "-v".to_string(),
        backup_file.to_string_lossy().into_owned(),
    ])
}

/// Loads `backup_file` into the already provisioned `target` with `pg_restore`.
pub async fn restore_database(
    runner: &dyn CommandRunner,
    journal: &dyn Journal,
    pg_restore: &ExternalTool,
    target: &ConnectionTarget,
    backup_file: &Path,
    policy: FailurePolicy,
) -> Result<Option<ProcessOutput>> {
    let args = restore_args(target, backup_file)?;
    run_tool(runner, journal, pg_restore, &args, policy).await
}
