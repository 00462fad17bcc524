mod logic;
pub(crate) mod archive;
pub(crate) mod db_dump;

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

pub use logic::run_backup_flow;

/// One backup on local disk, raw or gzipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    pub path: PathBuf,
    pub compressed: bool,
    pub timestamp: DateTime<Local>,
    pub database: String,
}

impl BackupArtifact {
    /// The raw artifact a dump of `database` started at `timestamp` writes.
    pub fn planned(backup_dir: &Path, database: &str, timestamp: DateTime<Local>) -> Self {
        Self {
            path: backup_dir.join(artifact_file_name(database, timestamp)),
            compressed: false,
            timestamp,
            database: database.to_string(),
        }
    }

    /// A backup is only stored once its compressed archive exists.
    pub fn is_complete(&self) -> bool {
        self.compressed && self.path.is_file()
    }

    pub fn into_compressed(self, path: PathBuf) -> Self {
        Self {
            path,
            compressed: true,
            ..self
        }
    }
}

/// `backup-<YYYYMMDD-HHMMSS>-<database>.dump`
pub fn artifact_file_name(database: &str, timestamp: DateTime<Local>) -> String {
    format!("backup-{}-{}.dump", timestamp.format("%Y%m%d-%H%M%S"), database)
}
