//! Mirrors a scope tree onto the state root

use mirror_fs::{NormalizedPath, StateLock, StatePath, WriteOutcome, io};
use serde::Serialize;

use super::descriptor::{descriptor_file_name, legacy_descriptor_file_name, render_descriptor};
use super::naming::assign_directory_names;
use super::reset::ResetMode;
use crate::Result;
use crate::scope::ScopeNode;

/// Caller-supplied switches that influence the reset policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileFlags {
    /// Delete the whole state root before mirroring
    pub force: bool,
    /// Delete generated metadata only, keep user-authored files
    pub rebuild: bool,
}

/// Everything a reconciliation run changed or confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub mode: ResetMode,
    pub migration_detected: bool,
    /// Paths deleted by the reset step
    pub removed: Vec<NormalizedPath>,
    /// Directories created while mirroring
    pub created: Vec<NormalizedPath>,
    /// Descriptor files that were missing or out of date
    pub written: Vec<NormalizedPath>,
    /// Descriptor files that already matched
    pub unchanged: Vec<NormalizedPath>,
}

impl ReconcileReport {
    fn new(mode: ResetMode, migration_detected: bool) -> Self {
        Self {
            mode,
            migration_detected,
            removed: Vec::new(),
            created: Vec::new(),
            written: Vec::new(),
            unchanged: Vec::new(),
        }
    }

    /// True when the run neither deleted, created nor rewrote anything.
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.created.is_empty() && self.written.is_empty()
    }
}

/// Maps a discovered hierarchy onto directories below a state root.
///
/// Each scope becomes one directory, nested like the hierarchy, holding a
/// `.AzState` marker directory with the scope's descriptor. Anything else
/// found in the tree belongs to the user and is only ever removed by a
/// force reset.
#[derive(Debug, Clone)]
pub struct StateReconciler {
    root: NormalizedPath,
}

impl StateReconciler {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Lock the state root, pick the reset mode, apply it and mirror `tree`.
    ///
    /// Any filesystem failure aborts the run; nothing is rolled back.
    pub fn run(&self, tree: &ScopeNode, flags: ReconcileFlags) -> Result<ReconcileReport> {
        let _lock = StateLock::acquire(&self.root)?;

        let migration_detected = self.detect_migration(&tree.name)?;
        let mode = ResetMode::select(flags.force, flags.rebuild, migration_detected);
        tracing::info!(root = %self.root, %mode, migration_detected, "Reconciling state");

        let mut report = ReconcileReport::new(mode, migration_detected);
        self.apply_reset(mode, &mut report)?;
        self.mirror(tree, &mut report)?;

        tracing::info!(
            created = report.created.len(),
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            removed = report.removed.len(),
            "Reconciliation complete"
        );
        Ok(report)
    }

    /// Mirror `tree` incrementally without any reset step.
    pub fn reconcile(&self, tree: &ScopeNode) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::new(ResetMode::Incremental, false);
        self.mirror(tree, &mut report)?;
        Ok(report)
    }

    /// Whether the state root holds a descriptor written by the legacy
    /// layout for `root_name`.
    pub fn detect_migration(&self, root_name: &str) -> Result<bool> {
        if !self.root.is_dir() {
            return Ok(false);
        }
        let legacy = legacy_descriptor_file_name(root_name);
        let found = io::find_files_matching(&self.root, |name| name == legacy)?;
        if let Some(first) = found.first() {
            tracing::warn!(artifact = %first, "Legacy state layout detected");
        }
        Ok(!found.is_empty())
    }

    /// Execute the selected reset step.
    pub fn apply_reset(&self, mode: ResetMode, report: &mut ReconcileReport) -> Result<()> {
        match mode {
            ResetMode::Incremental => {}
            ResetMode::Rebuild => {
                let markers = io::find_dirs_named(&self.root, StatePath::MetadataMarker.as_str())?;
                tracing::info!(markers = markers.len(), "Removing generated metadata");
                for marker in markers {
                    io::remove_tree(&marker)?;
                    report.removed.push(marker);
                }
            }
            ResetMode::ForceReset => {
                if matches!(self.root.file_name(), None | Some(".") | Some("..")) {
                    return Err(mirror_fs::Error::UnsafePath {
                        path: self.root.to_native(),
                        reason: "refusing to delete a filesystem root or a relative component".into(),
                    }
                    .into());
                }
                tracing::warn!(root = %self.root, "Deleting entire state root");
                if self.root.exists() {
                    io::remove_tree(&self.root)?;
                    report.removed.push(self.root.clone());
                }
                io::ensure_dir(&self.root)?;
            }
        }
        Ok(())
    }

    fn mirror(&self, tree: &ScopeNode, report: &mut ReconcileReport) -> Result<()> {
        if self.root.is_network_path() {
            tracing::warn!(root = %self.root, "State root is on a network path");
        }
        if io::ensure_dir(&self.root)? {
            report.created.push(self.root.clone());
        }

        let names = assign_directory_names(std::slice::from_ref(tree));
        self.mirror_node(&self.root, tree, &names[0], report)
    }

    fn mirror_node(
        &self,
        parent_dir: &NormalizedPath,
        node: &ScopeNode,
        dir_name: &str,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let dir = parent_dir.join(dir_name);
        if io::ensure_dir(&dir)? {
            report.created.push(dir.clone());
        }

        let marker = dir.join(StatePath::MetadataMarker.as_str());
        if io::ensure_dir(&marker)? {
            report.created.push(marker.clone());
        }

        let descriptor = marker.join(&descriptor_file_name(node));
        match io::write_if_changed(&descriptor, render_descriptor(node)?.as_bytes())? {
            WriteOutcome::Written => {
                tracing::debug!(scope = %node.id, file = %descriptor, "Wrote descriptor");
                report.written.push(descriptor);
            }
            WriteOutcome::Unchanged => report.unchanged.push(descriptor),
        }

        let names = assign_directory_names(&node.children);
        for (child, name) in node.children.iter().zip(&names) {
            self.mirror_node(&dir, child, name, report)?;
        }
        Ok(())
    }
}
