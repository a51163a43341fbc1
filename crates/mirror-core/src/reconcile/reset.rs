//! Reset policy for a state root

use serde::Serialize;

/// How the existing state root is treated before mirroring.
///
/// Selected exactly once per run by [`ResetMode::select`]; the mutation
/// code only ever branches on the selected mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResetMode {
    /// Create what is missing, delete nothing
    Incremental,
    /// Delete every metadata marker directory, keep everything else
    Rebuild,
    /// Delete the whole state root and start empty
    ForceReset,
}

impl ResetMode {
    /// Precedence: force or a legacy layout beats rebuild, which beats
    /// incremental.
    pub fn select(force: bool, rebuild: bool, migration_detected: bool) -> Self {
        if force || migration_detected {
            Self::ForceReset
        } else if rebuild {
            Self::Rebuild
        } else {
            Self::Incremental
        }
    }
}

impl std::fmt::Display for ResetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incremental => write!(f, "incremental"),
            Self::Rebuild => write!(f, "rebuild"),
            Self::ForceReset => write!(f, "force reset"),
        }
    }
}
