//! Resolved settings display

use std::path::Path;

use colored::Colorize;
use mirror_core::{OptionKey, OptionValue};

use crate::error::Result;

/// Print the resolved settings as JSON, or each option with its source.
pub fn run_config(cwd: &Path, sources: bool) -> Result<()> {
    let resolver = super::resolver(cwd);

    if !sources {
        let settings = resolver.resolve_settings()?;
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    println!("{}", "Resolved options".bold());
    println!();
    for key in OptionKey::ALL {
        let (value, source) = resolver.resolve_with_source(*key)?;
        let shown = match value {
            OptionValue::Null => "(unset)".dimmed().to_string(),
            _ if key.is_secret() => "***".to_string(),
            value => value.to_string(),
        };
        println!("  {:<36} {:<40} {}", key.env_key(), shown, source.to_string().dimmed());
    }
    Ok(())
}
