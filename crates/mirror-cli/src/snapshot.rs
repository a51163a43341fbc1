//! Directory client backed by a tenant snapshot file
//!
//! A snapshot is a JSON (or YAML/TOML) document describing the tenant as a
//! directory service would report it:
//!
//! ```json
//! {
//!   "contexts": [{ "tenantId": "t1", "principal": "spn-mirror" }],
//!   "managementGroups": [
//!     { "id": "/providers/Microsoft.Management/managementGroups/t1",
//!       "name": "t1", "displayName": "Tenant Root Group",
//!       "children": [] }
//!   ],
//!   "subscriptions": [],
//!   "denied": []
//! }
//! ```
//!
//! Management groups named in `denied` answer with access denied.

use std::collections::{HashMap, HashSet};

use mirror_core::{
    CloudContext, ContextProvider, DirectoryClient, DirectoryError, ManagementGroupRecord,
    SubscriptionRecord,
};
use mirror_fs::{ConfigStore, NormalizedPath};
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    #[serde(default)]
    contexts: Vec<CloudContext>,
    #[serde(default)]
    management_groups: Vec<ManagementGroupRecord>,
    #[serde(default)]
    subscriptions: Vec<SubscriptionRecord>,
    #[serde(default)]
    denied: Vec<String>,
}

/// Answers directory queries from a loaded snapshot.
#[derive(Debug)]
pub struct SnapshotDirectoryClient {
    contexts: Vec<CloudContext>,
    groups: HashMap<String, ManagementGroupRecord>,
    subscriptions: Vec<SubscriptionRecord>,
    denied: HashSet<String>,
}

impl SnapshotDirectoryClient {
    /// Load a snapshot; the format follows the file extension.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let file: SnapshotFile = ConfigStore::new().load(path)?;
        tracing::debug!(
            %path,
            groups = file.management_groups.len(),
            subscriptions = file.subscriptions.len(),
            "Loaded tenant snapshot"
        );
        Ok(Self {
            contexts: file.contexts,
            groups: file
                .management_groups
                .into_iter()
                .map(|group| (group.name.clone(), group))
                .collect(),
            subscriptions: file.subscriptions,
            denied: file.denied.into_iter().collect(),
        })
    }
}

impl DirectoryClient for SnapshotDirectoryClient {
    fn get_management_group(
        &self,
        name: &str,
        _expand: bool,
        _recurse: bool,
    ) -> std::result::Result<ManagementGroupRecord, DirectoryError> {
        if self.denied.contains(name) {
            return Err(DirectoryError::AccessDenied {
                scope: name.to_string(),
            });
        }
        self.groups
            .get(name)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound {
                scope: name.to_string(),
            })
    }

    fn list_subscriptions(
        &self,
        tenant_id: &str,
        active_only: bool,
    ) -> std::result::Result<Vec<SubscriptionRecord>, DirectoryError> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|s| s.tenant_id == tenant_id)
            .filter(|s| !active_only || s.state.matches("Enabled"))
            .cloned()
            .collect())
    }
}

impl ContextProvider for SnapshotDirectoryClient {
    fn contexts(&self) -> Vec<CloudContext> {
        self.contexts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"{
        "contexts": [{ "tenantId": "t1", "principal": "spn" }],
        "managementGroups": [
            { "id": "/mg/t1", "name": "t1", "displayName": "Root",
              "children": [{ "id": "/mg/corp", "name": "corp", "displayName": "Corp",
                             "kind": "ManagementGroup" }] },
            { "id": "/mg/corp", "name": "corp", "displayName": "Corp", "parentId": "/mg/t1" }
        ],
        "subscriptions": [
            { "id": "s1", "displayName": "One", "state": "Enabled",
              "offerType": "MS-AZR-0017P", "tenantId": "t1" },
            { "id": "s2", "displayName": "Two", "state": "Disabled",
              "offerType": "MS-AZR-0017P", "tenantId": "t1" }
        ],
        "denied": ["corp"]
    }"#;

    fn load() -> SnapshotDirectoryClient {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tenant.json");
        fs::write(&path, SNAPSHOT).unwrap();
        SnapshotDirectoryClient::load(&NormalizedPath::new(&path)).unwrap()
    }

    #[test]
    fn serves_groups_contexts_and_subscriptions() {
        let client = load();
        assert_eq!(client.contexts()[0].tenant_id, "t1");
        assert_eq!(client.get_management_group("t1", true, false).unwrap().children.len(), 1);
        assert_eq!(client.list_subscriptions("t1", false).unwrap().len(), 2);
        assert_eq!(client.list_subscriptions("t1", true).unwrap().len(), 1);
        assert!(client.list_subscriptions("other", false).unwrap().is_empty());
    }

    #[test]
    fn denied_and_missing_groups() {
        let client = load();
        assert!(matches!(
            client.get_management_group("corp", true, false),
            Err(DirectoryError::AccessDenied { .. })
        ));
        assert!(matches!(
            client.get_management_group("nope", true, false),
            Err(DirectoryError::NotFound { .. })
        ));
    }
}
