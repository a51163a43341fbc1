//! Shared test utilities for the Tenant Mirror workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! each grow their own fake directory service. It is a dev-dependency only
//! and never published.
//!
//! # Modules
//!
//! - [`directory`]: [`FakeDirectory`], an in-memory directory service with
//!   failure injection and call counting
//! - [`tenant`]: canned tenant hierarchies and contexts
//! - [`state`]: [`TestState`] for assertions against a state root

pub mod directory;
pub mod state;
pub mod tenant;

pub use directory::FakeDirectory;
pub use state::TestState;
