// pgbackup/src/backup/db_dump.rs
use std::path::Path;

use crate::errors::Result;
use crate::utils::connection::ConnectionTarget;
use crate::utils::journal::Journal;
use crate::utils::process::{CommandRunner, ExternalTool, FailurePolicy, ProcessOutput, run_tool};

/// Arguments for a verbose custom-format `pg_dump` of `source` into `dest_file`.
pub fn dump_args(source: &ConnectionTarget, dest_file: &Path) -> Result<Vec<String>> {
    Ok(vec![
        format!("--dbname={}", source.uri()?),
        "-Fc".to_string(),
        "-f".to_string(),
        dest_file.to_string_lossy().into_owned(),
        "-v".to_string(),
    ])
}

/// Dumps `source` into `dest_file` with `pg_dump`.
pub async fn dump_database(
    runner: &dyn CommandRunner,
    journal: &dyn Journal,
    pg_dump: &ExternalTool,
    source: &ConnectionTarget,
    dest_file: &Path,
    policy: FailurePolicy,
) -> Result<Option<ProcessOutput>> {
    let args = dump_args(source, dest_file)?;
    run_tool(runner, journal, pg_dump, &args, policy).await
}
