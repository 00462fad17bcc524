// pgbackup/src/restore/logic.rs
use std::path::PathBuf;

use super::db_restore::DatabaseProvisioner;
use super::pg_restore::restore_database;
use super::{RestoreOptions, RestoreReport};
use crate::backup::archive::extract_file;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::utils::journal::Journal;
use crate::utils::validate_identifier;
use crate::workflow::Services;

const COMPONENT: &str = "restore";

/// Recreates the scratch restore database and loads the uncompressed dump
/// into it.
///
/// The dump must already exist uncompressed at `paths.restore_file`; it is
/// only inflated from `paths.restore_archive` when `options.extract` asks for
/// it. Nothing on the server is touched until that input is present.
pub async fn run_restore_flow(
    config: &AppConfig,
    services: &Services,
    options: &RestoreOptions,
) -> Result<RestoreReport> {
    let journal = services.journal.as_ref();
    let database = match &options.dest_db {
        Some(name) => validate_identifier(name)?.to_string(),
        None => config.restore_database_name(),
    };

    let backup_file = restore_input(config, journal, options.extract)?;

    journal.info(
        COMPONENT,
        &format!("Creating temp database for restore : {}", database),
    );
    let server = config.postgres.restore_server();
    journal.info(
        COMPONENT,
        &format!(
            "Provisioning on {}:{} as {}",
            server.host(),
            server.port(),
            server.user()
        ),
    );
    let created = services
        .provisioner
        .provision(&server, &database, &config.postgres.user)
        .await?;
    journal.info(
        COMPONENT,
        &format!("Created temp database for restore : {}", created),
    );

    journal.info(COMPONENT, "Restore starting");
    let output = restore_database(
        services.runner.as_ref(),
        journal,
        &config.pg_restore,
        &server.with_database(&created),
        &backup_file,
        config.restore_policy,
    )
    .await?;
    journal.info(COMPONENT, "Restore complete");

    Ok(RestoreReport {
        database: created,
        output,
    })
}

/// Resolves the uncompressed dump to restore, inflating the archive first
/// when asked to.
fn restore_input(config: &AppConfig, journal: &dyn Journal, extract: bool) -> Result<PathBuf> {
    let paths = &config.paths;
    let backup_file = if extract {
        journal.info(
            COMPONENT,
            &format!("Extracting {}", paths.restore_archive.display()),
        );
        let extracted = extract_file(&paths.restore_archive)?;
        journal.info(COMPONENT, &format!("Extracted to {}", extracted.display()));
        extracted
    } else {
        paths.restore_file.clone()
    };

    if !backup_file.is_file() {
        return Err(AppError::MissingRestoreInput {
            path: backup_file,
            hint: (!extract && paths.restore_archive.is_file())
                .then(|| paths.restore_archive.clone()),
        });
    }
    Ok(backup_file)
}
