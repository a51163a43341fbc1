//! Management hierarchy discovery
//!
//! Expands a root management group into a full [`ScopeNode`] tree, one
//! directory request per management group. Sibling subtrees are
//! independent, so they may be expanded on a bounded worker pool; results
//! are always assembled in the order the directory service listed them.

use std::str::FromStr;

use rayon::prelude::*;
use serde::Serialize;

use crate::scope::{
    ChildRecord, DirectoryClient, DirectoryError, ManagementGroupRecord, ScopeKind, ScopeNode,
};
use crate::{Error, Result};

/// What to do when a management group below the root cannot be expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtreeFailurePolicy {
    /// Fail the whole discovery
    #[default]
    Abort,
    /// Leave the management group out of the tree and record it
    Skip,
}

impl FromStr for SubtreeFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!("expected 'abort' or 'skip', got '{other}'")),
        }
    }
}

/// How sibling management groups are expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Parallelism {
    #[default]
    Sequential,
    /// Expand siblings on a worker pool of this many threads
    Bounded(usize),
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub policy: SubtreeFailurePolicy,
    pub parallelism: Parallelism,
}

/// A management group left out under [`SubtreeFailurePolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedScope {
    pub id: String,
    pub name: String,
    pub reason: String,
}

/// Result of one discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub root: ScopeNode,
    /// Subtrees omitted under the skip policy, in traversal order
    pub skipped: Vec<SkippedScope>,
}

impl Discovery {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Expanded child: either a node (with anything skipped below it) or a
/// skipped management group.
enum Branch {
    Node(ScopeNode, Vec<SkippedScope>),
    Skipped(SkippedScope),
}

/// Recursive expansion of the management group hierarchy.
pub struct ScopeDiscoveryEngine<'a> {
    client: &'a dyn DirectoryClient,
    /// Acting identity, reported when the root is not readable
    principal: String,
    options: DiscoveryOptions,
}

impl<'a> ScopeDiscoveryEngine<'a> {
    pub fn new(
        client: &'a dyn DirectoryClient,
        principal: impl Into<String>,
        options: DiscoveryOptions,
    ) -> Self {
        Self {
            client,
            principal: principal.into(),
            options,
        }
    }

    /// Discover the hierarchy below `root_name`.
    ///
    /// With `recurse` unset only the root and its immediate children are
    /// returned. Access denied at the root is always fatal
    /// ([`Error::Access`]); failures further down follow the configured
    /// [`SubtreeFailurePolicy`].
    pub fn discover(&self, root_name: &str, recurse: bool) -> Result<Discovery> {
        tracing::info!(
            root = root_name,
            recurse,
            parallelism = ?self.options.parallelism,
            "Discovering management group hierarchy"
        );

        let record = self
            .client
            .get_management_group(root_name, true, false)
            .map_err(|source| match source {
                DirectoryError::AccessDenied { .. } => Error::Access {
                    scope: root_name.to_string(),
                    principal: self.principal.clone(),
                },
                source => Error::Discovery {
                    scope: root_name.to_string(),
                    source,
                },
            })?;

        let (root, skipped) = match self.options.parallelism {
            Parallelism::Sequential => self.expand(record, recurse, &[])?,
            Parallelism::Bounded(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads.max(1))
                    .thread_name(|i| format!("discovery-{i}"))
                    .build()
                    .map_err(|e| Error::WorkerPool {
                        message: e.to_string(),
                    })?;
                pool.install(|| self.expand(record, recurse, &[]))?
            }
        };

        ensure_unique_ids(&root)?;
        for scope in &skipped {
            tracing::warn!(scope = %scope.id, reason = %scope.reason, "Skipped unreachable subtree");
        }
        tracing::info!(scopes = root.len(), skipped = skipped.len(), "Discovery complete");

        Ok(Discovery { root, skipped })
    }

    /// Build the node for `record` and expand its children.
    ///
    /// `ancestors` holds the ids from the root down to the parent of
    /// `record`, so a cycle in the source graph is reported instead of
    /// recursing forever.
    fn expand(
        &self,
        record: ManagementGroupRecord,
        recurse: bool,
        ancestors: &[String],
    ) -> Result<(ScopeNode, Vec<SkippedScope>)> {
        if ancestors.contains(&record.id) {
            return Err(Error::DuplicateScope { id: record.id });
        }
        let mut path = ancestors.to_vec();
        path.push(record.id.clone());

        tracing::debug!(
            scope = %record.id,
            children = record.children.len(),
            "Expanding management group"
        );

        let branches: Vec<Branch> = match self.options.parallelism {
            Parallelism::Bounded(_) if recurse => record
                .children
                .par_iter()
                .map(|child| self.expand_child(&record.id, child, recurse, &path))
                .collect::<Result<Vec<_>>>()?,
            _ => record
                .children
                .iter()
                .map(|child| self.expand_child(&record.id, child, recurse, &path))
                .collect::<Result<Vec<_>>>()?,
        };

        let mut children = Vec::with_capacity(branches.len());
        let mut skipped = Vec::new();
        for branch in branches {
            match branch {
                Branch::Node(node, below) => {
                    children.push(node);
                    skipped.extend(below);
                }
                Branch::Skipped(scope) => skipped.push(scope),
            }
        }

        let node = ScopeNode {
            id: record.id,
            name: record.name,
            display_name: record.display_name,
            kind: ScopeKind::ManagementGroup,
            parent_id: record.parent_id,
            children,
        };
        Ok((node, skipped))
    }

    fn expand_child(
        &self,
        parent_id: &str,
        child: &ChildRecord,
        recurse: bool,
        ancestors: &[String],
    ) -> Result<Branch> {
        if child.kind == ScopeKind::Subscription || !recurse {
            return Ok(Branch::Node(leaf(parent_id, child), Vec::new()));
        }

        let record = match self.client.get_management_group(&child.name, true, false) {
            Ok(record) => record,
            Err(source) => {
                return match self.options.policy {
                    SubtreeFailurePolicy::Abort => Err(Error::Discovery {
                        scope: child.id.clone(),
                        source,
                    }),
                    SubtreeFailurePolicy::Skip => Ok(Branch::Skipped(SkippedScope {
                        id: child.id.clone(),
                        name: child.name.clone(),
                        reason: source.to_string(),
                    })),
                };
            }
        };

        let (mut node, skipped) = self.expand(record, recurse, ancestors)?;
        // The tree's own parent link wins over whatever the service echoed back
        node.parent_id = Some(parent_id.to_string());
        Ok(Branch::Node(node, skipped))
    }
}

fn leaf(parent_id: &str, child: &ChildRecord) -> ScopeNode {
    ScopeNode {
        id: child.id.clone(),
        name: child.name.clone(),
        display_name: child.display_name.clone(),
        kind: child.kind,
        parent_id: Some(parent_id.to_string()),
        children: Vec::new(),
    }
}

/// Every scope id may appear only once in a discovered tree.
fn ensure_unique_ids(root: &ScopeNode) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for node in root.iter() {
        if !seen.insert(node.id.as_str()) {
            return Err(Error::DuplicateScope {
                id: node.id.clone(),
            });
        }
    }
    Ok(())
}
