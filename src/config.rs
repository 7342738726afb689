//! Configuration loading and validation.
//!
//! Path: `--config`, `$PULP_SELINUX_CONFIG`, or `~/.config/pulp-selinux/config.toml`.
//! A missing file means defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::policy::{PolicyVariant, DEFAULT_MODULE};
use crate::store::semodule::DEFAULT_SEMODULE;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "PULP_SELINUX_CONFIG";

/// Errors produced while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML for [`Config`].
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// Values parsed but are not usable.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// No home directory to resolve the default path from.
    #[error("cannot determine home directory")]
    NoHome,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Policy module name.
    pub module: String,
    /// Variants to operate on, in order.
    pub variants: Vec<PolicyVariant>,
    /// Path of the policy management tool.
    pub semodule: PathBuf,
    /// Root directory holding `<variant>/<module>.pp` packages.
    pub policy_dir: PathBuf,
    /// Per-invocation timeout for the policy tool, in seconds.
    pub timeout_secs: u64,
    /// Directory for JSON log files; unset keeps the process silent.
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_owned(),
            variants: PolicyVariant::ALL.to_vec(),
            semodule: PathBuf::from(DEFAULT_SEMODULE),
            policy_dir: PathBuf::from("/usr/share/selinux"),
            timeout_secs: 120,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration with env overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the result is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// Load configuration using a custom env resolver (for testing).
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match env(CONFIG_PATH_ENV) {
                Some(p) => PathBuf::from(p),
                None => config_dir()?.join("config.toml"),
            },
        };

        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loading config from file");
                parse_config(&contents, &path)?
            }
            // An explicitly named file has to exist.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                tracing::debug!("no config file found, using defaults");
                Config::default()
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        config.apply_overrides(env);
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (env > config > defaults).
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("PULP_SELINUX_SEMODULE") {
            self.semodule = PathBuf::from(v);
        }
        if let Some(v) = env("PULP_SELINUX_MODULE") {
            self.module = v;
        }
        if let Some(v) = env("PULP_SELINUX_POLICY_DIR") {
            self.policy_dir = PathBuf::from(v);
        }
        if let Some(v) = env("PULP_SELINUX_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = env("PULP_SELINUX_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.timeout_secs = n,
                Err(_) => tracing::warn!(
                    var = "PULP_SELINUX_TIMEOUT_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// Check that the values can drive the policy tool.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.module.is_empty() {
            return Err(ConfigError::Invalid("module name is empty".into()));
        }
        if self
            .module
            .chars()
            .any(|c| c.is_whitespace() || c == '/')
        {
            return Err(ConfigError::Invalid(format!(
                "module name '{}' contains whitespace or '/'",
                self.module
            )));
        }
        if self.variants.is_empty() {
            return Err(ConfigError::Invalid("no policy variants configured".into()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.variants.iter().find(|v| !seen.insert(**v)) {
            return Err(ConfigError::Invalid(format!("variant '{dup}' listed twice")));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Per-invocation timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_config(contents: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the default config directory (`~/.config/pulp-selinux/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let home = directories::BaseDirs::new().ok_or(ConfigError::NoHome)?;
    Ok(home.home_dir().join(".config").join("pulp-selinux"))
}
