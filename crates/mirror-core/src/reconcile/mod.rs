//! State reconciliation
//!
//! Turns a discovered scope tree into the on-disk mirror:
//!
//! ```text
//! <state root>/
//!   Tenant Root Group/
//!     .AzState/Microsoft.Management-managementGroups_<tenant>.parameters.json
//!     Platform/
//!       .AzState/...
//!       Production (sub-a)/
//!       Production (sub-b)/
//! ```

mod descriptor;
mod naming;
mod reconciler;
mod reset;

pub use descriptor::{descriptor_file_name, legacy_descriptor_file_name, render_descriptor};
pub use naming::assign_directory_names;
pub use reconciler::{ReconcileFlags, ReconcileReport, StateReconciler};
pub use reset::ResetMode;
