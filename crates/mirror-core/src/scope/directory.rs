//! Boundary to the cloud directory service and session contexts
//!
//! The concrete transport (authentication, HTTP, retries and timeouts) lives
//! outside this crate. Implementations only have to answer the two queries
//! below; they may be called from several worker threads at once.

use serde::{Deserialize, Serialize};

use super::model::{ScopeKind, SubscriptionRecord};

/// Errors reported by a directory service implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("access denied to {scope}")]
    AccessDenied { scope: String },

    #[error("{scope} was not found")]
    NotFound { scope: String },

    #[error("directory request failed: {message}")]
    Transport { message: String },
}

/// An immediate child as listed by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub kind: ScopeKind,
}

/// A management group together with its immediate children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementGroupRecord {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<ChildRecord>,
}

/// Read access to the tenant's management hierarchy.
pub trait DirectoryClient: Send + Sync {
    /// Fetch a management group by name.
    ///
    /// With `expand` set the immediate children are included; with
    /// `recurse` set the service may include deeper levels as well. The
    /// discovery engine always asks for one level at a time.
    fn get_management_group(
        &self,
        name: &str,
        expand: bool,
        recurse: bool,
    ) -> Result<ManagementGroupRecord, DirectoryError>;

    /// List the subscriptions visible in `tenant_id`.
    fn list_subscriptions(
        &self,
        tenant_id: &str,
        active_only: bool,
    ) -> Result<Vec<SubscriptionRecord>, DirectoryError>;
}

/// A signed-in cloud context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudContext {
    pub tenant_id: String,
    /// The acting identity, reported in access errors
    pub principal: String,
    #[serde(default)]
    pub subscription_id: Option<String>,
}

/// Source of the cloud contexts available to this process.
pub trait ContextProvider {
    fn contexts(&self) -> Vec<CloudContext>;
}

impl ContextProvider for Vec<CloudContext> {
    fn contexts(&self) -> Vec<CloudContext> {
        self.clone()
    }
}
