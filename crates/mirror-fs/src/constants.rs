//! Names that make up the on-disk state layout.

use std::path::Path;

/// Well-known names in a state tree and its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatePath {
    /// The `.AzState` marker directory inside every generated scope directory.
    /// It is the only content a rebuild may delete.
    MetadataMarker,
    /// The `.mirror` directory holding the optional settings file
    SettingsDir,
    /// The settings file inside [`StatePath::SettingsDir`]
    SettingsFile,
    /// Suffix of the run lock file placed next to the state root
    LockSuffix,
}

impl StatePath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetadataMarker => ".AzState",
            Self::SettingsDir => ".mirror",
            Self::SettingsFile => "config.toml",
            Self::LockSuffix => ".lock",
        }
    }
}

impl AsRef<Path> for StatePath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for StatePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for StatePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
