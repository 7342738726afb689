//! Lifecycle operations for the policy module across variants.
//!
//! - [`uninstall`]: best-effort removal, never fails
//! - [`install`]: load compiled packages, stops at the first failure
//! - [`status`]: per-variant presence report, never fails

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::policy::PolicyVariant;
use crate::store::{ModuleStore, StoreError};

/// Result of one removal attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum RemovalOutcome {
    /// The tool reported success.
    Removed,
    /// The tool failed; the reason is kept for diagnostics only.
    Failed(String),
}

/// Per-variant record of an uninstall run, in the order variants were visited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    /// Attempted variants and their outcome.
    pub attempts: Vec<(PolicyVariant, RemovalOutcome)>,
}

impl RemovalReport {
    /// Number of variants the module was removed from.
    pub fn removed(&self) -> usize {
        self.attempts
            .iter()
            .filter(|(_, outcome)| *outcome == RemovalOutcome::Removed)
            .count()
    }
}

/// Remove `module` from every variant in `variants`, one at a time.
///
/// Every failure is swallowed. The report exists for logging and tests;
/// callers treat the run as successful regardless of its contents.
pub async fn uninstall(
    store: &dyn ModuleStore,
    module: &str,
    variants: &[PolicyVariant],
) -> RemovalReport {
    let mut report = RemovalReport::default();
    for &variant in variants {
        let outcome = match store.remove(variant, module).await {
            Ok(()) => RemovalOutcome::Removed,
            Err(e) => {
                debug!(%variant, module, error = %e, "module removal failed, ignoring");
                RemovalOutcome::Failed(e.to_string())
            }
        };
        report.attempts.push((variant, outcome));
    }
    info!(
        module,
        attempted = report.attempts.len(),
        removed = report.removed(),
        "uninstall cleanup finished"
    );
    report
}

/// Result of installing into one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum InstallOutcome {
    /// Package was loaded into the variant's store.
    Installed {
        /// Package that was loaded.
        package: PathBuf,
    },
    /// No package was built for the variant.
    Skipped {
        /// Package path that was looked for.
        package: PathBuf,
    },
}

/// Errors produced by [`install`].
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// No variant had a package under the policy directory.
    #[error("no policy package for module '{module}' under {}", policy_dir.display())]
    NoPackages {
        /// Module being installed.
        module: String,
        /// Directory that was searched.
        policy_dir: PathBuf,
    },
    /// The store rejected a package.
    #[error("failed to install into {variant}: {source}")]
    Store {
        /// Variant the install failed for.
        variant: PolicyVariant,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },
}

/// Path of the compiled package for `module` under `policy_dir` for `variant`.
pub fn package_path(policy_dir: &Path, variant: PolicyVariant, module: &str) -> PathBuf {
    policy_dir
        .join(variant.as_str())
        .join(format!("{module}.pp"))
}

/// Load `module` into every variant that has a compiled package.
///
/// Variants without a package are skipped. Variants already installed stay
/// installed when a later one fails.
///
/// # Errors
///
/// Returns [`InstallError::Store`] on the first store failure and
/// [`InstallError::NoPackages`] when every variant was skipped.
pub async fn install(
    store: &dyn ModuleStore,
    module: &str,
    variants: &[PolicyVariant],
    policy_dir: &Path,
) -> Result<Vec<(PolicyVariant, InstallOutcome)>, InstallError> {
    let mut outcomes = Vec::with_capacity(variants.len());
    for &variant in variants {
        let package = package_path(policy_dir, variant, module);
        if !package.is_file() {
            debug!(%variant, package = %package.display(), "no policy package, skipping");
            outcomes.push((variant, InstallOutcome::Skipped { package }));
            continue;
        }
        store
            .install(variant, &package)
            .await
            .map_err(|source| InstallError::Store { variant, source })?;
        info!(%variant, package = %package.display(), "policy package installed");
        outcomes.push((variant, InstallOutcome::Installed { package }));
    }

    if outcomes
        .iter()
        .all(|(_, o)| matches!(o, InstallOutcome::Skipped { .. }))
    {
        return Err(InstallError::NoPackages {
            module: module.to_owned(),
            policy_dir: policy_dir.to_path_buf(),
        });
    }
    Ok(outcomes)
}

/// Presence of the module in one variant's store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum ModuleStatus {
    /// The module is listed in the store.
    Present,
    /// The store was listed and the module is not in it.
    Absent,
    /// The store could not be listed.
    Unavailable(String),
}

impl ModuleStatus {
    /// Short label used in plain-text output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Per-variant status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantStatus {
    /// Variant that was queried.
    pub variant: PolicyVariant,
    /// Presence of the module.
    #[serde(flatten)]
    pub status: ModuleStatus,
}

/// Tab-separated `variant state [reason]` line for plain-text output.
impl fmt::Display for VariantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.variant, self.status.label())?;
        if let ModuleStatus::Unavailable(reason) = &self.status {
            write!(f, "\t{reason}")?;
        }
        Ok(())
    }
}

/// Report whether `module` is installed in each variant.
pub async fn status(
    store: &dyn ModuleStore,
    module: &str,
    variants: &[PolicyVariant],
) -> Vec<VariantStatus> {
    let mut out = Vec::with_capacity(variants.len());
    for &variant in variants {
        let status = match store.list(variant).await {
            Ok(modules) if modules.iter().any(|m| m == module) => ModuleStatus::Present,
            Ok(_) => ModuleStatus::Absent,
            Err(e) => {
                debug!(%variant, error = %e, "cannot list policy store");
                ModuleStatus::Unavailable(e.to_string())
            }
        };
        out.push(VariantStatus { variant, status });
    }
    out
}
