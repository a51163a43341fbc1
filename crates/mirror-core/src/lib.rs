//! Hierarchy discovery and state reconciliation for Tenant Mirror
//!
//! This crate turns a cloud tenant's management hierarchy into a
//! deterministic directory tree:
//!
//! - **Configuration**: typed option snapshot resolved from overrides,
//!   environment, settings files and defaults
//! - **Session**: tenant guard over the available cloud contexts and owner
//!   of the scope cache
//! - **Discovery**: recursive, optionally parallel expansion of the
//!   management group tree
//! - **Catalog**: subscription exclusion by offer and state
//! - **Reconciliation**: mirroring the tree onto disk with incremental,
//!   rebuild and force-reset modes
//!
//! # Architecture
//!
//! ```text
//!                  CLI
//!                   |
//!               mirror-core
//!   config -> session -> discovery -> catalog -> reconcile
//!                   |
//!               mirror-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mirror_core::{ConfigResolver, ReconcileFlags, Session};
//! use mirror_fs::NormalizedPath;
//!
//! let settings = ConfigResolver::new(NormalizedPath::new(".")).resolve_settings()?;
//! let mut session = Session::initialize(Arc::new(settings), &contexts)?;
//! let report = session.pull(&client, ReconcileFlags::default())?;
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod reconcile;
pub mod scope;
pub mod session;

pub use cache::ScopeCache;
pub use catalog::SubscriptionCatalog;
pub use config::{ConfigResolver, OptionKey, OptionValue, Settings};
pub use discovery::{
    Discovery, DiscoveryOptions, Parallelism, ScopeDiscoveryEngine, SkippedScope,
    SubtreeFailurePolicy,
};
pub use error::{Error, Result};
pub use reconcile::{ReconcileFlags, ReconcileReport, ResetMode, StateReconciler};
pub use scope::{
    ChildRecord, CloudContext, ContextProvider, DirectoryClient, DirectoryError,
    ManagementGroupRecord, ScopeKind, ScopeNode, SubscriptionRecord, SubscriptionState,
};
pub use session::{PullReport, Session};
