//! In-memory [`DirectoryClient`] for tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use mirror_core::{
    ChildRecord, DirectoryClient, DirectoryError, ManagementGroupRecord, ScopeKind,
    SubscriptionRecord, SubscriptionState,
};

/// Resource id of a management group.
pub fn management_group_id(name: &str) -> String {
    format!("/providers/Microsoft.Management/managementGroups/{name}")
}

/// Resource id of a subscription.
pub fn subscription_id(id: &str) -> String {
    format!("/subscriptions/{id}")
}

/// A tenant hierarchy held in memory.
///
/// Children are listed in insertion order. Every request is recorded so
/// tests can assert how often the service was hit.
///
/// # Example
///
/// ```rust
/// use mirror_test_utils::FakeDirectory;
///
/// let directory = FakeDirectory::new("tenant-1")
///     .management_group("tenant-1", "corp", "Corp")
///     .subscription("corp", "sub-1", "Workload", "Enabled", "MS-AZR-0017P");
/// assert_eq!(directory.group_count(), 2);
/// ```
#[derive(Debug)]
pub struct FakeDirectory {
    tenant_id: String,
    groups: BTreeMap<String, ManagementGroupRecord>,
    subscriptions: Vec<SubscriptionRecord>,
    denied: HashSet<String>,
    failing: BTreeMap<String, DirectoryError>,
    deny_listing: bool,
    group_calls: AtomicUsize,
    listing_calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl FakeDirectory {
    /// A tenant with only its root group, named after the tenant id.
    pub fn new(tenant_id: &str) -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(
            tenant_id.to_string(),
            ManagementGroupRecord {
                id: management_group_id(tenant_id),
                name: tenant_id.to_string(),
                display_name: "Tenant Root Group".to_string(),
                parent_id: None,
                children: Vec::new(),
            },
        );
        Self {
            tenant_id: tenant_id.to_string(),
            groups,
            subscriptions: Vec::new(),
            denied: HashSet::new(),
            failing: BTreeMap::new(),
            deny_listing: false,
            group_calls: AtomicUsize::new(0),
            listing_calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Add a management group below `parent`.
    ///
    /// # Panics
    /// Panics if `parent` has not been added.
    pub fn management_group(mut self, parent: &str, name: &str, display_name: &str) -> Self {
        let id = management_group_id(name);
        self.child_of(parent).push(ChildRecord {
            id: id.clone(),
            name: name.to_string(),
            display_name: display_name.to_string(),
            kind: ScopeKind::ManagementGroup,
        });
        self.groups.insert(
            name.to_string(),
            ManagementGroupRecord {
                id,
                name: name.to_string(),
                display_name: display_name.to_string(),
                parent_id: Some(management_group_id(parent)),
                children: Vec::new(),
            },
        );
        self
    }

    /// Add a subscription below `parent` and to the tenant listing.
    ///
    /// # Panics
    /// Panics if `parent` has not been added.
    pub fn subscription(
        mut self,
        parent: &str,
        id: &str,
        display_name: &str,
        state: &str,
        offer_type: &str,
    ) -> Self {
        self.child_of(parent).push(ChildRecord {
            id: subscription_id(id),
            name: id.to_string(),
            display_name: display_name.to_string(),
            kind: ScopeKind::Subscription,
        });
        let tenant_id = self.tenant_id.clone();
        self.subscriptions.push(SubscriptionRecord {
            id: id.to_string(),
            display_name: display_name.to_string(),
            state: state.parse::<SubscriptionState>().unwrap_or_else(|e| match e {}),
            offer_type: offer_type.to_string(),
            tenant_id,
        });
        self
    }

    /// Add a subscription to the tenant listing without placing it in the
    /// hierarchy.
    pub fn unplaced_subscription(mut self, id: &str, state: &str, offer_type: &str) -> Self {
        let tenant_id = self.tenant_id.clone();
        self.subscriptions.push(SubscriptionRecord {
            id: id.to_string(),
            display_name: id.to_string(),
            state: state.parse::<SubscriptionState>().unwrap_or_else(|e| match e {}),
            offer_type: offer_type.to_string(),
            tenant_id,
        });
        self
    }

    /// Answer requests for management group `name` with access denied.
    pub fn deny(mut self, name: &str) -> Self {
        self.denied.insert(name.to_string());
        self
    }

    /// Answer requests for management group `name` with `error`.
    pub fn fail(mut self, name: &str, error: DirectoryError) -> Self {
        self.failing.insert(name.to_string(), error);
        self
    }

    /// Answer the subscription listing with access denied.
    pub fn deny_subscription_listing(mut self) -> Self {
        self.deny_listing = true;
        self
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of management group requests served or refused so far.
    pub fn group_calls(&self) -> usize {
        self.group_calls.load(Ordering::SeqCst)
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.group_calls() + self.listing_calls()
    }

    /// Names of the management groups requested, sorted.
    pub fn requested_groups(&self) -> Vec<String> {
        let mut names = self.requested.lock().unwrap().clone();
        names.sort();
        names
    }

    fn child_of(&mut self, parent: &str) -> &mut Vec<ChildRecord> {
        &mut self
            .groups
            .get_mut(parent)
            .unwrap_or_else(|| panic!("FakeDirectory: unknown parent group '{parent}'"))
            .children
    }
}

impl DirectoryClient for FakeDirectory {
    fn get_management_group(
        &self,
        name: &str,
        _expand: bool,
        _recurse: bool,
    ) -> Result<ManagementGroupRecord, DirectoryError> {
        self.group_calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(name.to_string());

        if self.denied.contains(name) {
            return Err(DirectoryError::AccessDenied {
                scope: management_group_id(name),
            });
        }
        if let Some(error) = self.failing.get(name) {
            return Err(error.clone());
        }
        self.groups
            .get(name)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound {
                scope: management_group_id(name),
            })
    }

    fn list_subscriptions(
        &self,
        tenant_id: &str,
        _active_only: bool,
    ) -> Result<Vec<SubscriptionRecord>, DirectoryError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if self.deny_listing {
            return Err(DirectoryError::AccessDenied {
                scope: format!("/tenants/{tenant_id}"),
            });
        }
        Ok(self
            .subscriptions
            .iter()
            .filter(|s| s.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}
