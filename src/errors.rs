use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid identifier '{0}': only ASCII letters, digits, '_' and '-' are allowed")]
    InvalidIdentifier(String),

    #[error("Artifact not found: {}", .path.display())]
    ArtifactNotFound { path: PathBuf },

    #[error("Artifact {} does not end in .gz", .path.display())]
    NotCompressed { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot connect to {endpoint}: {source}")]
    Connectivity {
        endpoint: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("{statement} failed for database '{database}': {source}")]
    Provisioning {
        statement: &'static str,
        database: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to launch {program}: {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed. Return code : {status}")]
    ProcessFailed { program: String, status: String },

    #[error("Restore input {} is missing{}", .path.display(), extract_hint(.hint))]
    MissingRestoreInput {
        path: PathBuf,
        hint: Option<PathBuf>,
    },
}

fn extract_hint(archive: &Option<PathBuf>) -> String {
    match archive {
        Some(archive) => format!(" (found {}; rerun with --extract)", archive.display()),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
