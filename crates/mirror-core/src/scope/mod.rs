//! Scope model and the directory service boundary

mod directory;
mod model;

pub use directory::{
    ChildRecord, CloudContext, ContextProvider, DirectoryClient, DirectoryError,
    ManagementGroupRecord,
};
pub use model::{ScopeKind, ScopeNode, SubscriptionRecord, SubscriptionState};
