//! External tool invocation
//!
//! The conversion pipelines shell out to `xcrun`-hosted tools. They do so
//! through the narrow [`CommandRunner`] seam so tests can substitute canned
//! output for real invocations. Execution is blocking and sequential; each
//! process is spawned, its output captured in full, and its exit status
//! checked before the next step runs.

use std::process::Command;

use crate::error::CoverageError;

/// Captured output of one external tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status code (-1 when terminated by signal)
    pub status: i32,
    /// Captured stdout, lossily decoded
    pub stdout: String,
    /// Captured stderr, lossily decoded
    pub stderr: String,
}

impl ToolOutput {
    /// Check for a zero exit status
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Run an external command and capture its output and exit code
pub trait CommandRunner {
    /// Spawn `program` with `args`, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns `CoverageError::Io` when the process cannot be spawned
    /// (typically a missing tool).
    fn run(&self, program: &str, args: &[&str]) -> Result<ToolOutput, CoverageError>;
}

/// [`CommandRunner`] backed by [`std::process::Command`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<ToolOutput, CoverageError> {
        let output = Command::new(program).args(args).output()?;
        Ok(ToolOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
