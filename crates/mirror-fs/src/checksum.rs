//! SHA-256 checksum utilities
//!
//! Whole state trees hash to one `sha256:<hex>` string, which makes "the
//! directory is byte-identical to last run" a single string comparison.

use sha2::{Digest, Sha256};

use crate::io::walk;
use crate::{Error, NormalizedPath, Result};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute a checksum over a whole directory tree.
///
/// Covers every entry's path relative to `root`, whether it is a directory
/// or a file, and file contents. Entries are visited in name order so the
/// result does not depend on directory iteration order.
pub fn compute_tree_checksum(root: &NormalizedPath) -> Result<String> {
    let prefix_len = root.as_str().trim_end_matches('/').len();
    let mut hasher = Sha256::new();
    let mut failure = None;

    walk(root, &mut |entry, is_dir| {
        if failure.is_some() {
            return false;
        }
        let relative = &entry.as_str()[prefix_len..];
        if is_dir {
            hasher.update(b"d:");
            hasher.update(relative.as_bytes());
            hasher.update(b"\n");
        } else {
            let native_path = entry.to_native();
            match std::fs::read(&native_path) {
                Ok(content) => {
                    hasher.update(b"f:");
                    hasher.update(relative.as_bytes());
                    hasher.update(b"\n");
                    hasher.update(&content);
                    hasher.update(b"\n");
                }
                Err(e) => failure = Some(Error::io(native_path, e)),
            }
        }
        true
    })?;

    if let Some(err) = failure {
        return Err(err);
    }
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}
