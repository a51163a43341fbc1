//! Tenant Mirror CLI
//!
//! Mirrors a cloud tenant's management hierarchy into a state directory.

mod cli;
mod commands;
mod error;
mod snapshot;

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use mirror_core::{OptionKey, OptionValue};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    init_tracing(&cwd, cli.verbose)?;

    match cli.command {
        Some(cmd) => execute_command(&cwd, cmd),
        None => {
            println!("{} Tenant Mirror CLI", "mirror".green().bold());
            println!();
            println!("Run {} for available commands.", "mirror --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cwd: &Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Pull(args) => commands::run_pull(cwd, &args),
        Commands::Config { sources } => commands::run_config(cwd, sources),
        Commands::Init { force } => commands::run_init(cwd, force),
    }
}

/// Install the log subscriber on stderr. `MIRROR_LOG` takes an env-filter
/// directive; otherwise the level follows `--verbose`.
fn init_tracing(cwd: &Path, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env("MIRROR_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    // A broken settings file is reported by the command itself
    let timestamps = matches!(
        commands::resolver(cwd).resolve(OptionKey::EnableTimestamp),
        Ok(OptionValue::Bool(true))
    );

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr);
    let installed = if timestamps {
        tracing::subscriber::set_global_default(builder.finish())
    } else {
        tracing::subscriber::set_global_default(builder.without_time().finish())
    };
    installed.map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;

    tracing::debug!(verbose, timestamps, "Logging initialized");
    Ok(())
}
