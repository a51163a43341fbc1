//! Error types for mirror-core

use crate::scope::DirectoryError;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
///
/// Every variant is fatal for the run that produced it. Migration of a
/// legacy layout is not an error; it selects a force reset instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No cloud context is available at all
    #[error("No cloud context available; sign in before running discovery")]
    Context,

    /// Available contexts span more than one tenant
    #[error(
        "Cloud contexts span {} tenants ({}); select a single tenant or set MIRROR_IGNORE_CONTEXT_CHECK",
        tenants.len(),
        tenants.join(", ")
    )]
    MultiTenant { tenants: Vec<String> },

    /// The discovery root (or tenant-level listing) is not readable
    #[error("Access denied to scope {scope} for principal {principal}")]
    Access { scope: String, principal: String },

    /// A configuration value could not be coerced to its declared type
    #[error("Invalid value for {option}: {message}")]
    Config { option: String, message: String },

    /// The directory service failed below the discovery root
    #[error("Discovery failed at {scope}: {source}")]
    Discovery {
        scope: String,
        #[source]
        source: DirectoryError,
    },

    /// A scope was reached twice during one traversal
    #[error("Scope {id} appears more than once in the discovered hierarchy")]
    DuplicateScope { id: String },

    /// The bounded discovery worker pool could not be created
    #[error("Failed to start discovery worker pool: {message}")]
    WorkerPool { message: String },

    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn config(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            option: option.into(),
            message: message.into(),
        }
    }
}
