//! Run session: tenant guard, cached discovery and the pull pipeline

use std::collections::BTreeSet;
use std::sync::Arc;

use mirror_fs::NormalizedPath;
use serde::Serialize;

use crate::cache::ScopeCache;
use crate::catalog::SubscriptionCatalog;
use crate::config::Settings;
use crate::discovery::{Discovery, DiscoveryOptions, ScopeDiscoveryEngine, SkippedScope};
use crate::reconcile::{ReconcileFlags, ReconcileReport, StateReconciler};
use crate::scope::{CloudContext, ContextProvider, DirectoryClient, SubscriptionRecord};
use crate::{Error, Result};

/// Owns the settings snapshot, the selected tenant and the scope cache for
/// one process.
#[derive(Debug)]
pub struct Session {
    settings: Arc<Settings>,
    context: CloudContext,
    cache: ScopeCache,
}

/// Summary of one pull.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullReport {
    pub tenant_id: String,
    pub root: String,
    pub scopes: usize,
    pub subscriptions: usize,
    pub skipped: Vec<SkippedScope>,
    pub reconcile: ReconcileReport,
}

impl Session {
    /// Validate the available cloud contexts and open a session.
    ///
    /// Fails with [`Error::Context`] when there is no context and with
    /// [`Error::MultiTenant`] when the contexts disagree on the tenant,
    /// unless the context check is disabled in `settings`.
    pub fn initialize(settings: Arc<Settings>, contexts: &dyn ContextProvider) -> Result<Self> {
        let available = contexts.contexts();
        let Some(first) = available.first().cloned() else {
            return Err(Error::Context);
        };

        let tenants: BTreeSet<&str> = available.iter().map(|c| c.tenant_id.as_str()).collect();
        if tenants.len() > 1 {
            if !settings.ignore_context_check {
                return Err(Error::MultiTenant {
                    tenants: tenants.into_iter().map(str::to_string).collect(),
                });
            }
            tracing::warn!(
                tenants = tenants.len(),
                selected = %first.tenant_id,
                "Multiple tenants available, context check disabled"
            );
        }

        tracing::info!(tenant = %first.tenant_id, principal = %first.principal, "Session initialized");
        Ok(Self {
            settings,
            context: first,
            cache: ScopeCache::new(),
        })
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn tenant_id(&self) -> &str {
        &self.context.tenant_id
    }

    pub fn principal(&self) -> &str {
        &self.context.principal
    }

    pub fn cache(&self) -> &ScopeCache {
        &self.cache
    }

    /// Discovery root: the partial root when configured, else the tenant
    /// root group (named after the tenant id).
    pub fn root_scope_name(&self) -> &str {
        self.settings
            .partial_mg_discovery_root
            .as_deref()
            .unwrap_or(&self.context.tenant_id)
    }

    /// Discover the hierarchy, served from the cache unless it is empty or
    /// invalidation is configured.
    pub fn discover(&mut self, client: &dyn DirectoryClient) -> Result<Arc<Discovery>> {
        let engine = ScopeDiscoveryEngine::new(
            client,
            self.context.principal.clone(),
            DiscoveryOptions {
                policy: self.settings.subtree_failure_policy,
                parallelism: self.settings.parallelism(),
            },
        );
        let root = self.root_scope_name().to_string();
        self.cache
            .discovery(self.settings.invalidate_cache, || engine.discover(&root, true))
    }

    /// Qualifying subscriptions, served from the cache on the same terms as
    /// [`Session::discover`].
    pub fn qualifying_subscriptions(
        &mut self,
        client: &dyn DirectoryClient,
    ) -> Result<Arc<Vec<SubscriptionRecord>>> {
        let catalog = SubscriptionCatalog::new(client, self.context.principal.clone());
        let settings = Arc::clone(&self.settings);
        let tenant_id = self.context.tenant_id.clone();
        self.cache.subscriptions(settings.invalidate_cache, || {
            catalog.list_qualifying(
                &tenant_id,
                &settings.excluded_sub_offers,
                &settings.excluded_sub_states,
            )
        })
    }

    /// Discover, filter subscriptions and mirror the result onto the
    /// configured state root.
    pub fn pull(&mut self, client: &dyn DirectoryClient, flags: ReconcileFlags) -> Result<PullReport> {
        let discovery = self.discover(client)?;
        let subscriptions = self.qualifying_subscriptions(client)?;
        let tree = discovery.root.retain_subscriptions(&subscriptions);

        let reconciler = StateReconciler::new(NormalizedPath::new(&self.settings.state));
        let reconcile = reconciler.run(&tree, flags)?;

        Ok(PullReport {
            tenant_id: self.context.tenant_id.clone(),
            root: tree.id.clone(),
            scopes: tree.len(),
            subscriptions: tree
                .iter()
                .filter(|node| !node.is_management_group())
                .count(),
            skipped: discovery.skipped.clone(),
            reconcile,
        })
    }
}
