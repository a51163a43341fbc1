//! Settings file scaffolding

use std::collections::BTreeMap;
use std::path::Path;

use colored::Colorize;
use mirror_core::{OptionKey, OptionValue};
use mirror_fs::ConfigStore;

use crate::error::{CliError, Result};

/// Default values of every non-secret option that has one, keyed by the
/// option's environment key.
pub fn default_table() -> BTreeMap<&'static str, OptionValue> {
    OptionKey::ALL
        .iter()
        .filter(|key| !key.is_secret())
        .map(|key| (key.env_key(), key.default_value()))
        .filter(|(_, value)| !value.is_null())
        .collect()
}

/// Write `.mirror/config.toml` below `cwd`.
pub fn run_init(cwd: &Path, force: bool) -> Result<()> {
    let path = super::resolver(cwd).settings_file();
    if path.exists() && !force {
        return Err(CliError::user(format!(
            "{} already exists; use --force to overwrite",
            path
        )));
    }

    ConfigStore::new().save(&path, &default_table())?;
    println!("{} Wrote {}", "OK".green().bold(), path);
    Ok(())
}
