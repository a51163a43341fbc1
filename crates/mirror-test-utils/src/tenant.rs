//! Canned tenant hierarchies.

use mirror_core::CloudContext;

use crate::FakeDirectory;

/// Tenant id used by [`sample_tenant`].
pub const SAMPLE_TENANT: &str = "0000-tenant";

/// Principal used by [`sample_context`].
pub const SAMPLE_PRINCIPAL: &str = "spn-mirror";

/// A small tenant:
///
/// ```text
/// Tenant Root Group
/// ├── Platform
/// │   ├── Connectivity      (sub-conn, Enabled)
/// │   └── Sandbox           (sub-sandbox, Disabled, dev/test offer)
/// └── Landing Zones
///     ├── Corp
///     │   └── Corp Workload (sub-corp, Enabled)
///     └── Online            (no subscriptions)
/// ```
pub fn sample_tenant() -> FakeDirectory {
    FakeDirectory::new(SAMPLE_TENANT)
        .management_group(SAMPLE_TENANT, "platform", "Platform")
        .management_group(SAMPLE_TENANT, "landingzones", "Landing Zones")
        .subscription("platform", "sub-conn", "Connectivity", "Enabled", "MS-AZR-0017P")
        .subscription("platform", "sub-sandbox", "Sandbox", "Disabled", "MS-AZR-0148P")
        .management_group("landingzones", "corp", "Corp")
        .management_group("landingzones", "online", "Online")
        .subscription("corp", "sub-corp", "Corp Workload", "Enabled", "MS-AZR-0017P")
}

/// A tenant with `width` management groups under the root, each holding
/// `depth` nested groups with one subscription at the bottom.
pub fn wide_tenant(width: usize, depth: usize) -> FakeDirectory {
    let mut directory = FakeDirectory::new(SAMPLE_TENANT);
    for branch in 0..width {
        let mut parent = SAMPLE_TENANT.to_string();
        for level in 0..depth {
            let name = format!("mg-{branch}-{level}");
            directory = directory.management_group(&parent, &name, &format!("Group {branch}.{level}"));
            parent = name;
        }
        directory = directory.subscription(
            &parent,
            &format!("sub-{branch}"),
            &format!("Subscription {branch}"),
            "Enabled",
            "MS-AZR-0017P",
        );
    }
    directory
}

/// A signed-in context for `tenant_id`.
pub fn context(tenant_id: &str, principal: &str) -> CloudContext {
    CloudContext {
        tenant_id: tenant_id.to_string(),
        principal: principal.to_string(),
        subscription_id: None,
    }
}

/// The single context matching [`sample_tenant`].
pub fn sample_context() -> Vec<CloudContext> {
    vec![context(SAMPLE_TENANT, SAMPLE_PRINCIPAL)]
}
