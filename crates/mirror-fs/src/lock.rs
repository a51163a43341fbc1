//! Run-level lock for a state root
//!
//! Reconciliation performs non-atomic multi-step directory mutations, so
//! two runs against the same state root must never overlap. The lock file
//! lives next to the root rather than inside it because a force reset
//! deletes the root itself.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result, StatePath};

/// An exclusive advisory lock held for the lifetime of the value.
#[derive(Debug)]
pub struct StateLock {
    file: File,
    path: NormalizedPath,
}

impl StateLock {
    /// Path of the lock file guarding `root`.
    pub fn lock_path(root: &NormalizedPath) -> Result<NormalizedPath> {
        let name = root.file_name().ok_or_else(|| Error::UnsafePath {
            path: root.to_native(),
            reason: "state root has no final component".into(),
        })?;
        let parent = root.parent().unwrap_or_else(|| NormalizedPath::new("."));
        Ok(parent.join(&format!(".{}{}", name, StatePath::LockSuffix)))
    }

    /// Try to take the lock without blocking.
    ///
    /// Fails with [`Error::Locked`] when another run holds it.
    pub fn acquire(root: &NormalizedPath) -> Result<Self> {
        let path = Self::lock_path(root)?;
        let native_path = path.to_native();
        if let Some(parent) = native_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native_path)
            .map_err(|e| Error::io(&native_path, e))?;

        file.try_lock_exclusive()
            .map_err(|e| lock_error(root, &native_path, e))?;
        tracing::debug!(lock = %path, "Acquired state lock");

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

/// Contention means another run holds the lock; anything else is an I/O
/// failure of the lock file itself.
fn lock_error(root: &NormalizedPath, lock_file: &Path, source: io::Error) -> Error {
    if source.kind() == fs2::lock_contended_error().kind() {
        Error::Locked {
            path: root.to_native(),
        }
    } else {
        Error::io(lock_file, source)
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!(lock = %self.path, error = %e, "Failed to release state lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn second_acquire_fails_while_first_is_held() {
        let temp = TempDir::new().unwrap();
        let root = NormalizedPath::new(temp.path().join("root"));

        let first = StateLock::acquire(&root).unwrap();
        let second = StateLock::acquire(&root);
        assert!(matches!(second, Err(Error::Locked { .. })));

        drop(first);
        assert!(StateLock::acquire(&root).is_ok());
    }

    #[test]
    fn only_contention_reports_locked() {
        let root = NormalizedPath::new("/data/root");
        let lock_file = Path::new("/data/.root.lock");

        let contended = lock_error(&root, lock_file, fs2::lock_contended_error());
        assert!(matches!(contended, Error::Locked { .. }));

        let unsupported = io::Error::new(io::ErrorKind::Unsupported, "no locks here");
        match lock_error(&root, lock_file, unsupported) {
            Error::Io { path, source } => {
                assert_eq!(path, lock_file);
                assert_eq!(source.kind(), io::ErrorKind::Unsupported);
            }
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }

    #[test]
    fn lock_file_is_a_sibling_of_the_root() {
        let root = NormalizedPath::new("/data/root");
        let lock = StateLock::lock_path(&root).unwrap();
        assert_eq!(lock.as_str(), "/data/.root.lock");
    }
}
