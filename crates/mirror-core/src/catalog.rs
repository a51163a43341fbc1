//! Subscription listing and exclusion filtering

use crate::scope::{DirectoryClient, DirectoryError, SubscriptionRecord};
use crate::{Error, Result};

/// Lists the tenant's subscriptions that should be mirrored.
pub struct SubscriptionCatalog<'a> {
    client: &'a dyn DirectoryClient,
    principal: String,
}

impl<'a> SubscriptionCatalog<'a> {
    pub fn new(client: &'a dyn DirectoryClient, principal: impl Into<String>) -> Self {
        Self {
            client,
            principal: principal.into(),
        }
    }

    /// Subscriptions in `tenant_id` that survive the exclusion lists.
    ///
    /// Membership is what matters; callers must not rely on the order.
    pub fn list_qualifying(
        &self,
        tenant_id: &str,
        excluded_offers: &[String],
        excluded_states: &[String],
    ) -> Result<Vec<SubscriptionRecord>> {
        let all = self
            .client
            .list_subscriptions(tenant_id, false)
            .map_err(|source| match source {
                DirectoryError::AccessDenied { .. } => Error::Access {
                    scope: format!("/tenants/{tenant_id}"),
                    principal: self.principal.clone(),
                },
                source => Error::Discovery {
                    scope: format!("/tenants/{tenant_id}"),
                    source,
                },
            })?;

        let total = all.len();
        let qualifying: Vec<_> = all
            .into_iter()
            .filter(|record| {
                let keep = is_qualifying(record, excluded_offers, excluded_states);
                if !keep {
                    tracing::debug!(
                        subscription = %record.id,
                        offer = %record.offer_type,
                        state = %record.state,
                        "Excluding subscription"
                    );
                }
                keep
            })
            .collect();

        tracing::info!(total, qualifying = qualifying.len(), "Listed subscriptions");
        Ok(qualifying)
    }
}

/// A subscription qualifies unless its offer matches an excluded offer
/// exactly or its state matches an excluded state ignoring case.
pub fn is_qualifying(
    record: &SubscriptionRecord,
    excluded_offers: &[String],
    excluded_states: &[String],
) -> bool {
    let offer_excluded = excluded_offers.iter().any(|offer| *offer == record.offer_type);
    let state_excluded = excluded_states.iter().any(|state| record.state.matches(state));
    !(offer_excluded || state_excluded)
}
