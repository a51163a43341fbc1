//! [`TestState`] for assertions against a generated state tree.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary workspace holding a state root at `<tmp>/state`.
pub struct TestState {
    temp_dir: TempDir,
}

impl Default for TestState {
    fn default() -> Self {
        Self::new()
    }
}

impl TestState {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// The temporary workspace.
    pub fn workspace(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The state root inside the workspace. It is not created up front.
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("state")
    }

    /// Path of `relative` below the state root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file below the state root, creating parents.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Write `.mirror/config.toml` in the workspace.
    pub fn write_settings(&self, toml: &str) {
        let dir = self.workspace().join(".mirror");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), toml).unwrap();
    }

    /// Assert that `relative` exists below the state root.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(path.exists(), "Expected path to exist: {}", path.display());
    }

    /// Assert that `relative` does **not** exist below the state root.
    pub fn assert_not_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(!path.exists(), "Expected path NOT to exist: {}", path.display());
    }

    /// Assert that the file at `relative` contains `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        let actual = fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()));
        assert!(
            actual.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path.display(),
            content,
            actual
        );
    }

    /// Sorted names of the directories directly below `relative`.
    pub fn dir_names(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path(relative))
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
