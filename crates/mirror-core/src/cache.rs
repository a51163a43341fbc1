//! Memoization of discovery results within a session
//!
//! There is no expiry: a cached tree is served until the caller asks for a
//! refresh. Values are handed out as `Arc`s so consumers share one
//! read-only copy.

use std::sync::Arc;

use crate::Result;
use crate::discovery::Discovery;
use crate::scope::SubscriptionRecord;

/// Last discovered hierarchy and qualifying subscription set.
#[derive(Debug, Default)]
pub struct ScopeCache {
    discovery: Option<Arc<Discovery>>,
    subscriptions: Option<Arc<Vec<SubscriptionRecord>>>,
}

impl ScopeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached hierarchy, running `discover` when the cache is
    /// empty or `invalidate` is set.
    ///
    /// A failed refresh leaves the slot empty.
    pub fn discovery(
        &mut self,
        invalidate: bool,
        discover: impl FnOnce() -> Result<Discovery>,
    ) -> Result<Arc<Discovery>> {
        refresh(&mut self.discovery, invalidate, discover, "hierarchy")
    }

    /// Return the cached subscription set, running `list` when the cache is
    /// empty or `invalidate` is set.
    pub fn subscriptions(
        &mut self,
        invalidate: bool,
        list: impl FnOnce() -> Result<Vec<SubscriptionRecord>>,
    ) -> Result<Arc<Vec<SubscriptionRecord>>> {
        refresh(&mut self.subscriptions, invalidate, list, "subscriptions")
    }

    /// Drop both cached values.
    pub fn invalidate(&mut self) {
        self.discovery = None;
        self.subscriptions = None;
    }

    pub fn is_empty(&self) -> bool {
        self.discovery.is_none() && self.subscriptions.is_none()
    }

    pub fn cached_discovery(&self) -> Option<Arc<Discovery>> {
        self.discovery.clone()
    }
}

fn refresh<T>(
    slot: &mut Option<Arc<T>>,
    invalidate: bool,
    load: impl FnOnce() -> Result<T>,
    what: &str,
) -> Result<Arc<T>> {
    if !invalidate && let Some(cached) = slot {
        tracing::debug!(what, "Serving from cache");
        return Ok(Arc::clone(cached));
    }

    tracing::debug!(what, invalidate, "Refreshing cache");
    *slot = None;
    let fresh = Arc::new(load()?);
    *slot = Some(Arc::clone(&fresh));
    Ok(fresh)
}
