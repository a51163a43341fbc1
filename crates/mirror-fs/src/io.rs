//! Atomic and change-aware I/O operations for state trees

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Outcome of a change-aware write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was missing or held different content and has been replaced.
    Written,
    /// The file already held exactly this content; nothing was touched.
    Unchanged,
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a reader never observes a partial
/// file. Parent directories are created as needed.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|e| Error::io(&temp_path, e))?;
    drop(temp_file);

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    Ok(())
}

/// Write content only when it differs from what is already on disk.
///
/// Repeated runs over unchanged input leave files (and their mtimes)
/// untouched.
pub fn write_if_changed(path: &NormalizedPath, content: &[u8]) -> Result<WriteOutcome> {
    let native_path = path.to_native();
    match fs::read(&native_path) {
        Ok(existing) if existing == content => return Ok(WriteOutcome::Unchanged),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(&native_path, e)),
    }
    write_atomic(path, content)?;
    Ok(WriteOutcome::Written)
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Create a directory (and its parents) if it does not exist.
///
/// Returns `true` when the directory was created by this call.
pub fn ensure_dir(path: &NormalizedPath) -> Result<bool> {
    let native_path = path.to_native();
    if native_path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(&native_path).map_err(|e| Error::io(&native_path, e))?;
    Ok(true)
}

/// Remove a directory and everything below it. Missing directories are
/// not an error.
pub fn remove_tree(path: &NormalizedPath) -> Result<()> {
    let native_path = path.to_native();
    match fs::remove_dir_all(&native_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(&native_path, e)),
    }
}

/// Collect every directory named `name` below `root`, in sorted order.
///
/// Matching directories are not descended into. Symlinks are not followed.
pub fn find_dirs_named(root: &NormalizedPath, name: &str) -> Result<Vec<NormalizedPath>> {
    let mut found = Vec::new();
    walk(root, &mut |entry, is_dir| {
        if is_dir && entry.file_name() == Some(name) {
            found.push(entry.clone());
            return false;
        }
        true
    })?;
    Ok(found)
}

/// Collect every regular file below `root` whose name satisfies `predicate`,
/// in sorted order.
pub fn find_files_matching(
    root: &NormalizedPath,
    predicate: impl Fn(&str) -> bool,
) -> Result<Vec<NormalizedPath>> {
    let mut found = Vec::new();
    walk(root, &mut |entry, is_dir| {
        if !is_dir && entry.file_name().is_some_and(&predicate) {
            found.push(entry.clone());
        }
        true
    })?;
    Ok(found)
}

/// Depth-first walk over `root` with entries visited in name order.
///
/// The visitor returns whether a directory should be descended into.
pub(crate) fn walk(
    root: &NormalizedPath,
    visit: &mut dyn FnMut(&NormalizedPath, bool) -> bool,
) -> Result<()> {
    let native_root = root.to_native();
    if !native_root.is_dir() {
        return Ok(());
    }

    let mut entries = fs::read_dir(&native_root)
        .map_err(|e| Error::io(&native_root, e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::io(&native_root, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_type = entry
            .file_type()
            .map_err(|e| Error::io(entry.path(), e))?;
        let path = NormalizedPath::new(entry.path());
        let is_dir = file_type.is_dir();
        let descend = visit(&path, is_dir);
        if is_dir && descend {
            walk(&path, visit)?;
        }
    }
    Ok(())
}
