//! `pulp-selinux` command-line entry point.
//!
//! With no subcommand the binary runs the uninstall cleanup, which prints
//! nothing and always exits 0.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use pulp_selinux::cleanup::{self, InstallOutcome};
use pulp_selinux::config::Config;
use pulp_selinux::logging::{self, LoggingGuard};
use pulp_selinux::store::semodule::Semodule;

#[derive(Parser, Debug)]
#[command(name = "pulp-selinux", version, about = "Manage the pulp SELinux policy module")]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Config file (default: ~/.config/pulp-selinux/config.toml)"
    )]
    config: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Log to stderr")]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Remove the module from every variant, ignoring failures.
    Uninstall,
    /// Load the compiled module into every variant that has a package.
    Install {
        #[arg(long, help = "Directory holding <variant>/<module>.pp packages")]
        policy_dir: Option<PathBuf>,
    },
    /// Show whether the module is loaded in each variant.
    Status {
        #[arg(long, help = "Output machine-readable JSON")]
        json: bool,
    },
}

#[derive(Serialize)]
struct JsonOut<T: Serialize> {
    ok: bool,
    data: T,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Uninstall) {
        Commands::Uninstall => {
            run_uninstall(cli.config, cli.verbose).await;
            Ok(())
        }
        Commands::Install { policy_dir } => {
            let config =
                Config::load(cli.config.as_deref()).context("failed to load configuration")?;
            let _guard = init_logging(&config, cli.verbose);
            let store = Semodule::new(config.semodule.clone(), config.timeout());
            let policy_dir = policy_dir.unwrap_or_else(|| config.policy_dir.clone());

            let outcomes =
                cleanup::install(&store, &config.module, &config.variants, &policy_dir)
                    .await
                    .with_context(|| format!("failed to install module '{}'", config.module))?;
            for (variant, outcome) in outcomes {
                if let InstallOutcome::Installed { package } = outcome {
                    println!("installed {}\t{}", variant, package.display());
                }
            }
            Ok(())
        }
        Commands::Status { json } => {
            let config =
                Config::load(cli.config.as_deref()).context("failed to load configuration")?;
            let _guard = init_logging(&config, cli.verbose);
            let store = Semodule::new(config.semodule.clone(), config.timeout());

            let lines = cleanup::status(&store, &config.module, &config.variants).await;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: true,
                        data: &lines
                    })?
                );
            } else {
                for line in &lines {
                    println!("{line}");
                }
            }
            Ok(())
        }
    }
}

/// Best-effort cleanup: configuration problems fall back to defaults and
/// nothing is reported to the caller.
async fn run_uninstall(config_path: Option<PathBuf>, verbose: bool) {
    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            if verbose {
                logging::init_cli();
            }
            tracing::debug!(error = %e, "config unusable, falling back to defaults");
            let mut fallback = Config::default();
            fallback.apply_overrides(|key| std::env::var(key).ok());
            if fallback.validate().is_ok() {
                fallback
            } else {
                Config::default()
            }
        }
    };
    let _guard = init_logging(&config, verbose);
    let store = Semodule::new(config.semodule.clone(), config.timeout());
    let _ = cleanup::uninstall(&store, &config.module, &config.variants).await;
}

fn init_logging(config: &Config, verbose: bool) -> Option<LoggingGuard> {
    if verbose {
        logging::init_cli();
        return None;
    }
    let dir = config.log_dir.as_deref()?;
    // Logging must never turn a run into a failure.
    logging::init_file(dir).ok()
}
