//! Regex exemplar generation.
//!
//! # Responsibilities
//! - Define the [`PatternGenerator`] seam used by the materializer
//! - Run the external `exrex` program with a count limit and a deadline
//!
//! # Design Decisions
//! - The executable is resolved once, on first use
//! - A timed-out child is killed, never left running
//! - Output is newline-delimited; blank lines are discarded

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Errors produced while expanding a pattern.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("empty regex pattern")]
    EmptyPattern,

    #[error("exrex not available: {0}")]
    NotAvailable(String),

    #[error("failed to run exrex: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("exrex timed out after {0:?}")]
    Timeout(Duration),

    #[error("exrex failed for {pattern:?}: {message}")]
    Failed { pattern: String, message: String },
}

/// Produces concrete strings matching a regular expression.
#[async_trait]
pub trait PatternGenerator: Send + Sync {
    /// Generate at most `max` strings matching `pattern`.
    async fn generate(&self, pattern: &str, max: usize) -> Result<Vec<String>, GeneratorError>;
}

/// [`PatternGenerator`] backed by the `exrex` command line tool.
#[derive(Debug)]
pub struct ExrexGenerator {
    program: String,
    timeout: Duration,
    resolved: OnceLock<Result<PathBuf, String>>,
}

impl ExrexGenerator {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            resolved: OnceLock::new(),
        }
    }

    fn executable(&self) -> Result<&Path, GeneratorError> {
        self.resolved
            .get_or_init(|| resolve_executable(&self.program))
            .as_deref()
            .map_err(|e| GeneratorError::NotAvailable(e.clone()))
    }
}

#[async_trait]
impl PatternGenerator for ExrexGenerator {
    async fn generate(&self, pattern: &str, max: usize) -> Result<Vec<String>, GeneratorError> {
        if pattern.trim().is_empty() {
            return Err(GeneratorError::EmptyPattern);
        }
        let executable = self.executable()?;

        let child = Command::new(executable)
            .arg("--max-number")
            .arg(max.to_string())
            .arg(pattern)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| GeneratorError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(GeneratorError::Failed {
                pattern: pattern.to_string(),
                message,
            });
        }

        let mut lines = split_non_empty_lines(&String::from_utf8_lossy(&output.stdout));
        lines.truncate(max);
        Ok(lines)
    }
}

/// Locate `name`: a literal path if it contains a separator, else `PATH`,
/// else the working directory.
fn resolve_executable(name: &str) -> Result<PathBuf, String> {
    if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
        let path = PathBuf::from(name);
        return if path.is_file() {
            Ok(path)
        } else {
            Err(format!("not executable or not found: {name:?}"))
        };
    }

    if let Some(paths) = std::env::var_os("PATH") {
        if let Some(found) = std::env::split_paths(&paths)
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            return Ok(found);
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join(name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(format!(
        "executable {name:?} not found in PATH or working directory"
    ))
}

fn split_non_empty_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
