mod logic;
pub(crate) mod db_restore;
pub(crate) mod pg_restore;

use crate::utils::process::ProcessOutput;

pub use logic::run_restore_flow;

/// Per-invocation choices for a restore run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Overrides the derived `<db><suffix>` database name.
    pub dest_db: Option<String>,
    /// Inflate the configured archive before restoring.
    pub extract: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub database: String,
    /// `None` when `pg_restore` could not be launched.
    pub output: Option<ProcessOutput>,
}

impl RestoreReport {
    pub fn succeeded(&self) -> bool {
        self.output.as_ref().is_some_and(ProcessOutput::success)
    }
}
