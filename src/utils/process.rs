// pgbackup/src/utils/process.rs
use async_trait::async_trait;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use which::which;

use crate::errors::{AppError, Result};
use crate::utils::journal::Journal;

#[cfg(test)]
use mockall::automock;

/// What a failed external process does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FailurePolicy {
    /// Launch failure or non-zero exit aborts the workflow.
    #[serde(rename = "fatal")]
    FatalOnFailure,
    /// Launch failure or non-zero exit is logged and the workflow carries on.
    #[serde(rename = "log")]
    LogOnFailure,
}

/// Captured result of one finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => code.to_string(),
            None => "terminated by signal".to_string(),
        }
    }

    /// stdout lines followed by stderr lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().chain(self.stderr.lines())
    }
}

#[cfg(test)]
impl ProcessOutput {
    pub fn succeeded(stderr: &str) -> Self {
        Self {
            code: Some(0),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    pub fn failed(code: i32, stderr: &str) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

impl From<std::process::Output> for ProcessOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Launches a child process and blocks until it exits with both output
/// streams drained. There is no timeout.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &Path, args: &[String]) -> io::Result<ProcessOutput>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &Path, args: &[String]) -> io::Result<ProcessOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;
        Ok(output.into())
    }
}

/// A PostgreSQL client program, either pinned to a path or looked up on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    name: &'static str,
    path: Option<PathBuf>,
}

impl ExternalTool {
    pub fn new(name: &'static str, path: Option<PathBuf>) -> Self {
        Self { name, path }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn resolve(&self) -> io::Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        which(self.name).map_err(|e| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "{} executable not found in PATH ({}). Please ensure PostgreSQL \
                     client tools are installed and in your PATH.",
                    self.name, e
                ),
            )
        })
    }
}

/// Runs `tool` to completion, relays its output line by line and applies
/// `policy` to launch failures and non-zero exits.
///
/// Returns `Ok(None)` only when the process could not be launched under
/// [`FailurePolicy::LogOnFailure`].
pub async fn run_tool(
    runner: &dyn CommandRunner,
    journal: &dyn Journal,
    tool: &ExternalTool,
    args: &[String],
    policy: FailurePolicy,
) -> Result<Option<ProcessOutput>> {
    let component = tool.name();
    let launched = match tool.resolve() {
        Ok(program) => runner.run(&program, args).await,
        Err(e) => Err(e),
    };

    let output = match launched {
        Ok(output) => output,
        Err(source) => {
            journal.error(component, &format!("Issue launching {} : {}", component, source));
            return match policy {
                FailurePolicy::FatalOnFailure => Err(AppError::ProcessLaunch {
                    program: component.to_string(),
                    source,
                }),
                FailurePolicy::LogOnFailure => Ok(None),
            };
        }
    };

    for line in output.lines() {
        journal.info(component, line);
    }

    if !output.success() {
        journal.error(
            component,
            &format!("Command failed. Return code : {}", output.status_text()),
        );
        if policy == FailurePolicy::FatalOnFailure {
            return Err(AppError::ProcessFailed {
                program: component.to_string(),
                status: output.status_text(),
            });
        }
    }

    Ok(Some(output))
}
