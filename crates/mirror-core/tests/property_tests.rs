use std::collections::HashSet;

use mirror_core::reconcile::assign_directory_names;
use mirror_core::{ScopeKind, ScopeNode};
use proptest::prelude::*;

fn siblings(labels: &[String]) -> Vec<ScopeNode> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| ScopeNode {
            id: format!("/mg/n{i}"),
            name: format!("n{i}"),
            display_name: label.clone(),
            kind: ScopeKind::ManagementGroup,
            parent_id: None,
            children: Vec::new(),
        })
        .collect()
}

// Small label pool so collisions (including case-only and suffix-shaped
// ones) are frequent
fn label() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Prod".to_string()),
        Just("prod".to_string()),
        Just("Dev".to_string()),
        Just("Prod (n1)".to_string()),
        Just("Prod (n1-2)".to_string()),
        Just(".AzState".to_string()),
        Just(".azstate".to_string()),
        Just(String::new()),
        "[a-c]{1,2}",
    ]
}

proptest! {
    #[test]
    fn test_names_are_unique_ignoring_case(labels in prop::collection::vec(label(), 0..12)) {
        let nodes = siblings(&labels);
        let names = assign_directory_names(&nodes);

        prop_assert_eq!(names.len(), nodes.len());
        let folded: HashSet<String> = names.iter().map(|n| n.to_lowercase()).collect();
        prop_assert_eq!(folded.len(), names.len());
        prop_assert!(!folded.contains(".azstate"));
    }

    #[test]
    fn test_names_are_deterministic(labels in prop::collection::vec(label(), 0..12)) {
        let nodes = siblings(&labels);
        prop_assert_eq!(assign_directory_names(&nodes), assign_directory_names(&nodes));
    }

    #[test]
    fn test_unique_labels_keep_their_plain_name(labels in prop::collection::hash_set("[A-Z][a-z]{2,6}", 0..8)) {
        let labels: Vec<String> = labels.into_iter().collect();
        let folded: HashSet<String> = labels.iter().map(|l| l.to_lowercase()).collect();
        prop_assume!(folded.len() == labels.len());

        prop_assert_eq!(assign_directory_names(&siblings(&labels)), labels);
    }
}
