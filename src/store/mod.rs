//! Policy module store abstraction and the host-tool implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::policy::PolicyVariant;

pub mod semodule;

/// Outcome of a single policy tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Process exit code (`None` when the process was killed or exit code unavailable).
    pub exit_code: Option<i32>,
    /// Captured stdout text.
    pub stdout: String,
    /// Captured stderr text.
    pub stderr: String,
    /// Whether the invocation exceeded the timeout.
    pub timed_out: bool,
    /// Wall-clock duration of the invocation.
    pub duration: Duration,
}

impl ExecResult {
    /// Returns `true` when the tool exited successfully (code 0, no timeout).
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Errors produced by module store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The policy tool could not be started (missing, not executable).
    #[error("failed to run {}: {source}", tool.display())]
    Spawn {
        /// Path of the tool that failed to start.
        tool: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The policy tool ran but reported failure.
    #[error("policy tool failed for variant {variant} (exit code {exit_code:?}): {stderr}")]
    Failed {
        /// Variant the call was scoped to.
        variant: PolicyVariant,
        /// Exit code, if the process exited normally.
        exit_code: Option<i32>,
        /// Trimmed stderr of the tool.
        stderr: String,
    },
    /// The policy tool exceeded its time budget and was killed.
    #[error("policy tool timed out for variant {variant} after {timeout:?}")]
    Timeout {
        /// Variant the call was scoped to.
        variant: PolicyVariant,
        /// Timeout budget that was exceeded.
        timeout: Duration,
    },
}

/// Per-variant policy module store on the host.
#[async_trait]
pub trait ModuleStore: Send + Sync {
    /// Remove `module` from the store of `variant`.
    async fn remove(&self, variant: PolicyVariant, module: &str) -> Result<(), StoreError>;
    /// Load the compiled policy package at `package` into the store of `variant`.
    async fn install(&self, variant: PolicyVariant, package: &Path) -> Result<(), StoreError>;
    /// Names of the modules installed in the store of `variant`.
    async fn list(&self, variant: PolicyVariant) -> Result<Vec<String>, StoreError>;
}

/// Parse `semodule -l` output into module names.
///
/// Older tools print `name<TAB>version`, newer ones only `name`.
pub fn parse_module_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_owned)
        .collect()
}
