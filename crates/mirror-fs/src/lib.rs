//! Filesystem layer for Tenant Mirror
//!
//! Provides normalized path handling, atomic and change-aware writes,
//! content checksums, the on-disk state layout markers, and the run-level
//! lock that serializes reconciliation runs against one state root.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use config::{ConfigStore, FileFormat};
pub use constants::StatePath;
pub use error::{Error, Result};
pub use io::WriteOutcome;
pub use lock::StateLock;
pub use path::{NormalizedPath, sanitize_segment};
