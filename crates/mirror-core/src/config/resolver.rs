//! Option resolution across override, environment, settings files and defaults
//!
//! Each option is resolved independently, highest precedence first:
//!
//! 1. Explicit overrides supplied by the caller (command-line switches)
//! 2. Environment variables
//! 3. Local settings file (`<root>/.mirror/config.toml`)
//! 4. Global settings file (`<config_dir>/tenant-mirror/config.toml`)
//! 5. Built-in defaults

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use mirror_fs::{ConfigStore, NormalizedPath, StatePath};
use serde_json::Value;

use super::schema::OptionKey;
use super::settings::Settings;
use super::value::OptionValue;
use crate::{Error, Result};

/// Source of environment-style key/value pairs.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    Override,
    Environment,
    File(NormalizedPath),
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Environment => write!(f, "environment"),
            Self::File(path) => write!(f, "file {}", path),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Resolves options from every configured source.
pub struct ConfigResolver {
    /// Working root containing the optional `.mirror/` settings directory
    root: NormalizedPath,
    overrides: BTreeMap<OptionKey, OptionValue>,
    env: Box<dyn EnvSource>,
    /// Override for the global settings directory (used for testing).
    /// When `None`, `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create a resolver reading the process environment.
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            overrides: BTreeMap::new(),
            env: Box::new(ProcessEnv),
            global_config_dir_override: None,
        }
    }

    /// Replace the environment source.
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Use a custom global settings directory instead of the platform one.
    pub fn with_global_config_dir(mut self, dir: PathBuf) -> Self {
        self.global_config_dir_override = Some(dir);
        self
    }

    /// Set an explicit override, the highest-precedence source.
    pub fn with_override(mut self, key: OptionKey, value: impl Into<OptionValue>) -> Self {
        self.overrides.insert(key, value.into());
        self
    }

    /// Set an explicit override from raw text, applying the usual coercion.
    pub fn with_raw_override(self, key: OptionKey, raw: &str) -> Self {
        self.with_override(key, OptionValue::coerce(raw))
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Path of the local settings file.
    pub fn settings_file(&self) -> NormalizedPath {
        self.root
            .join(StatePath::SettingsDir.as_str())
            .join(StatePath::SettingsFile.as_str())
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("tenant-mirror"))
    }

    /// Resolve one option to its coerced, untyped value.
    pub fn resolve(&self, key: OptionKey) -> Result<OptionValue> {
        let files = self.load_file_layers()?;
        Ok(self.resolve_from(key, &files).0)
    }

    /// Resolve one option and report which source supplied it.
    pub fn resolve_with_source(&self, key: OptionKey) -> Result<(OptionValue, ValueSource)> {
        let files = self.load_file_layers()?;
        Ok(self.resolve_from(key, &files))
    }

    /// Resolve every option into a typed, immutable snapshot.
    pub fn resolve_settings(&self) -> Result<Settings> {
        let files = self.load_file_layers()?;
        let settings = Settings::from_lookup(|key| Ok(self.resolve_from(key, &files).0))?;
        tracing::debug!(state = %settings.state.display(), "Resolved settings");
        Ok(settings)
    }

    fn resolve_from(
        &self,
        key: OptionKey,
        files: &BTreeMap<OptionKey, (OptionValue, NormalizedPath)>,
    ) -> (OptionValue, ValueSource) {
        if let Some(value) = self.overrides.get(&key) {
            return (value.clone(), ValueSource::Override);
        }
        if let Some(raw) = self.env.var(key.env_key()).filter(|v| !v.is_empty()) {
            return (OptionValue::coerce(&raw), ValueSource::Environment);
        }
        if let Some((value, path)) = files.get(&key) {
            return (value.clone(), ValueSource::File(path.clone()));
        }
        (key.default_value(), ValueSource::Default)
    }

    /// Load global then local settings files; local entries win.
    fn load_file_layers(&self) -> Result<BTreeMap<OptionKey, (OptionValue, NormalizedPath)>> {
        let mut merged = BTreeMap::new();

        if let Some(global_dir) = self.global_config_dir() {
            let global_path = NormalizedPath::new(global_dir.join(StatePath::SettingsFile.as_str()));
            self.merge_file(&global_path, &mut merged)?;
        }
        self.merge_file(&self.settings_file(), &mut merged)?;

        Ok(merged)
    }

    fn merge_file(
        &self,
        path: &NormalizedPath,
        merged: &mut BTreeMap<OptionKey, (OptionValue, NormalizedPath)>,
    ) -> Result<()> {
        if !path.is_file() {
            tracing::debug!(%path, "No settings file found, skipping");
            return Ok(());
        }
        tracing::debug!(%path, "Loading settings file");

        let table: BTreeMap<String, Value> = ConfigStore::new().load(path)?;
        for (name, value) in table {
            let Some(key) = OptionKey::from_env_key(&name) else {
                tracing::warn!(%path, option = %name, "Ignoring unknown option in settings file");
                continue;
            };
            let value = from_file_value(key, value)?;
            merged.insert(key, (value, path.clone()));
        }
        Ok(())
    }
}

/// Convert a settings file value to an option value. Strings go through the
/// same coercion as environment text.
fn from_file_value(key: OptionKey, value: Value) -> Result<OptionValue> {
    match value {
        Value::Null => Ok(OptionValue::Null),
        Value::Bool(b) => Ok(OptionValue::Bool(b)),
        Value::String(s) => Ok(OptionValue::coerce(&s)),
        Value::Number(n) => n
            .as_i64()
            .map(OptionValue::Integer)
            .ok_or_else(|| Error::config(key.env_key(), format!("expected an integer, got {n}"))),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(Error::config(
                    key.env_key(),
                    format!("list items must be strings, got {other}"),
                )),
            })
            .collect::<Result<Vec<_>>>()
            .map(OptionValue::List),
        Value::Object(_) => Err(Error::config(key.env_key(), "nested tables are not supported")),
    }
}
