//! Structured logging setup using `tracing-subscriber` and `tracing-appender`.
//!
//! The tool is silent by default. Two opt-in modes:
//! - **File** ([`init_file`]): JSON file layer with daily rotation, nothing on the terminal
//! - **CLI** ([`init_cli`]): human-readable stderr output for `-v`

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Holds the non-blocking writer guard for file logging.
///
/// The [`WorkerGuard`] must be kept alive for the duration of the process.
/// Dropping it flushes pending log entries and closes the file.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialise JSON file logging under `logs_dir`.
///
/// Writes to `{logs_dir}/pulp-selinux.log.YYYY-MM-DD`. Level is controlled
/// by `RUST_LOG` (default: `debug`, so swallowed failures are recorded).
///
/// # Errors
///
/// Returns an error if the logs directory or log file cannot be created, or
/// a global subscriber is already installed.
pub fn init_file(logs_dir: &Path) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(logs_dir).map_err(|e| {
        anyhow::anyhow!(
            "failed to create logs directory {}: {e}",
            logs_dir.display()
        )
    })?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("pulp-selinux.log")
        .build(logs_dir)
        .map_err(|e| {
            anyhow::anyhow!(
                "failed to open log file under {}: {e}",
                logs_dir.display()
            )
        })?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(env_filter("debug"))
        .with(json_layer)
        .try_init()?;

    Ok(LoggingGuard { _guard: guard })
}

/// Initialise human-readable logging to stderr (`-v`).
///
/// Controlled by `RUST_LOG` (default: `debug`). A second call is a no-op.
pub fn init_cli() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("debug"))
        .with_writer(std::io::stderr)
        .try_init();
}
