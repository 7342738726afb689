//! [`ModuleStore`] backed by the host `semodule` tool.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use super::{parse_module_list, ExecResult, ModuleStore, StoreError};
use crate::policy::PolicyVariant;

/// Default location of the policy management tool.
pub const DEFAULT_SEMODULE: &str = "/usr/sbin/semodule";

/// Runs `semodule` once per store operation.
#[derive(Debug, Clone)]
pub struct Semodule {
    tool: PathBuf,
    timeout: Duration,
}

impl Semodule {
    /// Create a store that invokes `tool` with the given per-call timeout.
    pub fn new(tool: PathBuf, timeout: Duration) -> Self {
        Self { tool, timeout }
    }

    /// Path of the tool this store invokes.
    pub fn tool(&self) -> &Path {
        &self.tool
    }

    /// Run the tool with `args`, capturing its output.
    ///
    /// Stdin is closed and neither stream is forwarded to the terminal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Spawn`] if the tool cannot be started.
    pub async fn run(&self, args: &[OsString]) -> Result<ExecResult, StoreError> {
        let started = Instant::now();
        let child = tokio::process::Command::new(&self.tool)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| StoreError::Spawn {
                tool: self.tool.clone(),
                source,
            })?;

        // On timeout the future (and the child with it) is dropped, which kills it.
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ExecResult {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                timed_out: false,
                duration: started.elapsed(),
            }),
            Ok(Err(source)) => Err(StoreError::Spawn {
                tool: self.tool.clone(),
                source,
            }),
            Err(_) => Ok(ExecResult {
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                timed_out: true,
                duration: started.elapsed(),
            }),
        }
    }

    async fn run_scoped(
        &self,
        variant: PolicyVariant,
        args: Vec<OsString>,
    ) -> Result<ExecResult, StoreError> {
        let mut full: Vec<OsString> = vec!["-s".into(), variant.as_str().into()];
        full.extend(args);

        let result = self.run(&full).await?;
        debug!(
            tool = %self.tool.display(),
            %variant,
            exit_code = ?result.exit_code,
            duration = ?result.duration,
            "policy tool finished"
        );

        if result.timed_out {
            return Err(StoreError::Timeout {
                variant,
                timeout: self.timeout,
            });
        }
        if !result.success() {
            return Err(StoreError::Failed {
                variant,
                exit_code: result.exit_code,
                stderr: result.stderr.trim().to_owned(),
            });
        }
        Ok(result)
    }
}

impl Default for Semodule {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_SEMODULE), Duration::from_secs(120))
    }
}

#[async_trait]
impl ModuleStore for Semodule {
    async fn remove(&self, variant: PolicyVariant, module: &str) -> Result<(), StoreError> {
        self.run_scoped(variant, vec!["-r".into(), module.into()])
            .await
            .map(|_| ())
    }

    async fn install(&self, variant: PolicyVariant, package: &Path) -> Result<(), StoreError> {
        self.run_scoped(variant, vec!["-i".into(), package.as_os_str().to_owned()])
            .await
            .map(|_| ())
    }

    async fn list(&self, variant: PolicyVariant) -> Result<Vec<String>, StoreError> {
        let result = self.run_scoped(variant, vec!["-l".into()]).await?;
        Ok(parse_module_list(&result.stdout))
    }
}
