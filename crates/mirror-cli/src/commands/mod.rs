//! Command implementations for mirror-cli

pub mod config;
pub mod init;
pub mod pull;

pub use config::run_config;
pub use init::run_init;
pub use pull::run_pull;

use std::path::Path;

use mirror_core::ConfigResolver;
use mirror_fs::NormalizedPath;

/// Resolver rooted at the working directory, reading the process
/// environment and the platform settings directory.
pub(crate) fn resolver(cwd: &Path) -> ConfigResolver {
    ConfigResolver::new(NormalizedPath::new(cwd))
}
