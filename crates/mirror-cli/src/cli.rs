//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Tenant Mirror - Mirror a cloud tenant's management hierarchy onto disk
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Discover the hierarchy and reconcile the state tree
    ///
    /// Examples:
    ///   mirror pull --snapshot tenant.json
    ///   mirror pull --snapshot tenant.json --state ./root --rebuild
    Pull(PullArgs),

    /// Show the resolved settings
    Config {
        /// Show where each option's value came from instead of JSON
        #[arg(long)]
        sources: bool,
    },

    /// Write a settings file with the default option values
    ///
    /// Creates .mirror/config.toml in the current directory.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}

/// Switches accepted by `pull`. Each one set on the command line becomes an
/// explicit override of the matching option.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PullArgs {
    /// Tenant snapshot file answering directory queries
    #[arg(long, env = "MIRROR_SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Root of the generated state tree
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Rediscover even when a cached hierarchy exists
    #[arg(long)]
    pub invalidate_cache: bool,

    /// Generalize exported templates
    #[arg(long)]
    pub generalize_templates: bool,

    /// Also export raw templates
    #[arg(long = "export-raw-template")]
    pub export_raw_templates: bool,

    /// Do not export policy resources
    #[arg(long)]
    pub skip_policy: bool,

    /// Do not export resource groups
    #[arg(long)]
    pub skip_resource_group: bool,

    /// Remove generated metadata before mirroring, keep everything else
    #[arg(long)]
    pub rebuild: bool,

    /// Delete the whole state tree before mirroring
    #[arg(long)]
    pub force: bool,

    /// Print the pull report as JSON
    #[arg(long)]
    pub json: bool,
}
