// pgbackup/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::connection::ConnectionTarget;
use crate::utils::process::{ExternalTool, FailurePolicy};
use crate::utils::validate_identifier;

pub const DEFAULT_BACKUP_DIR: &str = "/tmp";
pub const DEFAULT_RESTORE_FILE: &str = "/tmp/restore.dump";
pub const DEFAULT_RESTORE_ARCHIVE: &str = "/tmp/restore.dump.gz";
pub const DEFAULT_RESTORE_SUFFIX: &str = "_restore";

// Structs for deserializing config.json
#[derive(Debug, Clone, Deserialize)]
pub struct JsonPostgresSection {
    pub source_host: Option<String>,
    pub db_host: Option<String>,
    pub port: Option<serde_json::Value>,
    pub db: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonPaths {
    pub backup_dir: Option<PathBuf>,
    pub restore_file: Option<PathBuf>,
    pub restore_archive: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonTools {
    pub pg_dump: Option<PathBuf>,
    pub pg_restore: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonPolicy {
    pub dump: Option<FailurePolicy>,
    pub restore: Option<FailurePolicy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawJsonConfig {
    pub postgresql: Option<JsonPostgresSection>,
    pub paths: Option<JsonPaths>,
    pub tools: Option<JsonTools>,
    pub policy: Option<JsonPolicy>,
    pub restore_suffix: Option<String>,
}

// Application's internal configuration structs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresSettings {
    pub source_host: String,
    pub db_host: String,
    pub port: u16,
    pub db: String,
    pub user: String,
    pub password: String,
}

impl PostgresSettings {
    /// The database `pg_dump` reads from.
    pub fn source_target(&self) -> ConnectionTarget {
        ConnectionTarget::new(&self.source_host, self.port, &self.db, &self.user, &self.password)
    }

    /// The server restores are provisioned on and loaded into.
    pub fn restore_server(&self) -> ConnectionTarget {
        ConnectionTarget::new(&self.db_host, self.port, &self.db, &self.user, &self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSettings {
    pub backup_dir: PathBuf,
    pub restore_file: PathBuf,
    pub restore_archive: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub postgres: PostgresSettings,
    pub paths: PathSettings,
    pub pg_dump: ExternalTool,
    pub pg_restore: ExternalTool,
    pub dump_policy: FailurePolicy,
    pub restore_policy: FailurePolicy,
    pub restore_suffix: String,
}

impl AppConfig {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
        let raw_json_config: RawJsonConfig = serde_json::from_str(&config_content)
            .with_context(|| {
                format!(
                    "Failed to parse JSON from config file at {}",
                    config_path.display()
                )
            })?;
        Self::from_raw(raw_json_config)
    }

    pub fn from_raw(raw: RawJsonConfig) -> Result<Self> {
        let section = raw
            .postgresql
            .context("postgresql section must be set in config.json")?;

        let postgres = PostgresSettings {
            source_host: required_host(section.source_host, "source_host")?,
            db_host: required_host(section.db_host, "db_host")?,
            port: parse_port(section.port.as_ref())?,
            db: required(section.db, "db")?,
            user: required(section.user, "user")?,
            password: section.password.unwrap_or_default(),
        };
        validate_identifier(&postgres.db).context("postgresql.db is not a valid database name")?;
        validate_identifier(&postgres.user).context("postgresql.user is not a valid role name")?;

        let restore_suffix = raw
            .restore_suffix
            .unwrap_or_else(|| DEFAULT_RESTORE_SUFFIX.to_string());
        validate_identifier(&format!("{}{}", postgres.db, restore_suffix))
            .context("restore_suffix does not yield a valid database name")?;

        let paths = raw.paths.unwrap_or_default();
        let tools = raw.tools.unwrap_or_default();
        let policy = raw.policy.unwrap_or_default();

        Ok(AppConfig {
            postgres,
            paths: PathSettings {
                backup_dir: paths.backup_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR)),
                restore_file: paths
                    .restore_file
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_RESTORE_FILE)),
                restore_archive: paths
                    .restore_archive
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_RESTORE_ARCHIVE)),
            },
            pg_dump: ExternalTool::new("pg_dump", tools.pg_dump),
            pg_restore: ExternalTool::new("pg_restore", tools.pg_restore),
            dump_policy: policy.dump.unwrap_or(FailurePolicy::FatalOnFailure),
            restore_policy: policy.restore.unwrap_or(FailurePolicy::LogOnFailure),
            restore_suffix,
        })
    }

    /// `<db><suffix>`, the scratch database every restore recreates.
    pub fn restore_database_name(&self) -> String {
        format!("{}{}", self.postgres.db, self.restore_suffix)
    }
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("postgresql.{} must be set in config.json", key))
}

fn required_host(value: Option<String>, key: &str) -> Result<String> {
    required(value, key).map(|host| host.trim().to_string())
}

/// Accepts `5432` as well as `"5432"`.
fn parse_port(value: Option<&serde_json::Value>) -> Result<u16> {
    let value = value.context("postgresql.port must be set in config.json")?;
    let port = match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .with_context(|| format!("postgresql.port {} is out of range", n))?,
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u16>()
            .with_context(|| format!("postgresql.port '{}' is not a valid port", s))?,
        other => anyhow::bail!("postgresql.port must be a number, got {}", other),
    };
    Ok(port)
}
