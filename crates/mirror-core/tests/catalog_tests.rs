//! Subscription listing and exclusion filtering

use mirror_core::{Error, Settings, SubscriptionCatalog};
use mirror_test_utils::tenant::{SAMPLE_PRINCIPAL, SAMPLE_TENANT, sample_tenant};
use pretty_assertions::assert_eq;

fn ids(records: &[mirror_core::SubscriptionRecord]) -> Vec<&str> {
    let mut ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    ids.sort();
    ids
}

#[test]
fn test_default_exclusions_drop_disabled_subscriptions() {
    let directory = sample_tenant();
    let settings = Settings::defaults().unwrap();
    let qualifying = SubscriptionCatalog::new(&directory, SAMPLE_PRINCIPAL)
        .list_qualifying(
            SAMPLE_TENANT,
            &settings.excluded_sub_offers,
            &settings.excluded_sub_states,
        )
        .unwrap();

    assert_eq!(ids(&qualifying), vec!["sub-conn", "sub-corp"]);
}

#[test]
fn test_offer_exclusion_is_exact() {
    let directory = sample_tenant();
    let catalog = SubscriptionCatalog::new(&directory, SAMPLE_PRINCIPAL);

    let exact = catalog
        .list_qualifying(SAMPLE_TENANT, &["MS-AZR-0017P".to_string()], &[])
        .unwrap();
    assert_eq!(ids(&exact), vec!["sub-sandbox"]);

    let case_differs = catalog
        .list_qualifying(SAMPLE_TENANT, &["ms-azr-0017p".to_string()], &[])
        .unwrap();
    assert_eq!(case_differs.len(), 3);
}

#[test]
fn test_state_exclusion_ignores_case() {
    let directory = sample_tenant();
    let qualifying = SubscriptionCatalog::new(&directory, SAMPLE_PRINCIPAL)
        .list_qualifying(SAMPLE_TENANT, &[], &["ENABLED".to_string()])
        .unwrap();
    assert_eq!(ids(&qualifying), vec!["sub-sandbox"]);
}

#[test]
fn test_unplaced_subscriptions_are_listed_too() {
    let directory = sample_tenant().unplaced_subscription("sub-orphan", "Enabled", "MS-AZR-0017P");
    let qualifying = SubscriptionCatalog::new(&directory, SAMPLE_PRINCIPAL)
        .list_qualifying(SAMPLE_TENANT, &[], &[])
        .unwrap();
    assert_eq!(qualifying.len(), 4);
}

#[test]
fn test_listing_denied_is_an_access_error() {
    let directory = sample_tenant().deny_subscription_listing();
    let err = SubscriptionCatalog::new(&directory, SAMPLE_PRINCIPAL)
        .list_qualifying(SAMPLE_TENANT, &[], &[])
        .unwrap_err();

    match err {
        Error::Access { scope, principal } => {
            assert_eq!(scope, format!("/tenants/{SAMPLE_TENANT}"));
            assert_eq!(principal, SAMPLE_PRINCIPAL);
        }
        other => panic!("expected an access error, got {other:?}"),
    }
}
