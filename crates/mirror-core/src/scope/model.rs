//! In-memory scope tree and subscription records

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of a node in the management hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    ManagementGroup,
    Subscription,
}

impl ScopeKind {
    /// Resource provider namespace owning this scope type.
    pub fn provider(&self) -> &'static str {
        match self {
            Self::ManagementGroup => "Microsoft.Management",
            Self::Subscription => "Microsoft.Subscription",
        }
    }

    /// Resource type name within [`ScopeKind::provider`].
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ManagementGroup => "managementGroups",
            Self::Subscription => "subscriptions",
        }
    }

    /// Fully-qualified resource type, e.g. `Microsoft.Management/managementGroups`.
    pub fn resource_type(&self) -> String {
        format!("{}/{}", self.provider(), self.type_name())
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManagementGroup => write!(f, "management group"),
            Self::Subscription => write!(f, "subscription"),
        }
    }
}

/// A node in the discovered hierarchy.
///
/// Trees are produced fresh by every discovery and never mutated
/// afterwards; derived trees (see [`ScopeNode::retain_subscriptions`]) are
/// new values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeNode {
    /// Fully-qualified scope path, unique within one discovery
    pub id: String,
    /// Short identifier (management group name or subscription id)
    pub name: String,
    pub display_name: String,
    pub kind: ScopeKind,
    /// Id of the immediate ancestor; `None` only for a root without a parent
    pub parent_id: Option<String>,
    /// Children in the order returned by the directory service
    #[serde(default)]
    pub children: Vec<ScopeNode>,
}

impl ScopeNode {
    /// Label used to derive the on-disk directory name.
    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    pub fn is_management_group(&self) -> bool {
        self.kind == ScopeKind::ManagementGroup
    }

    /// Pre-order iterator over this node and all descendants.
    pub fn iter(&self) -> ScopeIter<'_> {
        ScopeIter { stack: vec![self] }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// A tree always contains at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn find(&self, id: &str) -> Option<&ScopeNode> {
        self.iter().find(|node| node.id == id)
    }

    /// Copy of this tree keeping only subscriptions whose id is in
    /// `qualifying`. Management groups are always kept.
    pub fn retain_subscriptions(&self, qualifying: &[SubscriptionRecord]) -> ScopeNode {
        let keep: HashSet<&str> = qualifying.iter().map(|s| s.id.as_str()).collect();
        self.retain_with(&keep)
    }

    fn retain_with(&self, keep: &HashSet<&str>) -> ScopeNode {
        ScopeNode {
            children: self
                .children
                .iter()
                .filter(|child| child.is_management_group() || keep.contains(child.name.as_str()))
                .map(|child| child.retain_with(keep))
                .collect(),
            ..self.shallow_clone()
        }
    }

    fn shallow_clone(&self) -> ScopeNode {
        ScopeNode {
            id: self.id.clone(),
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            kind: self.kind,
            parent_id: self.parent_id.clone(),
            children: Vec::new(),
        }
    }
}

/// Pre-order traversal over a scope tree.
pub struct ScopeIter<'a> {
    stack: Vec<&'a ScopeNode>,
}

impl<'a> Iterator for ScopeIter<'a> {
    type Item = &'a ScopeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Lifecycle state of a subscription as reported by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionState {
    Enabled,
    Disabled,
    Deleted,
    Warned,
    Expired,
    PastDue,
    Other(String),
}

impl SubscriptionState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
            Self::Deleted => "Deleted",
            Self::Warned => "Warned",
            Self::Expired => "Expired",
            Self::PastDue => "PastDue",
            Self::Other(state) => state,
        }
    }

    /// Case-insensitive comparison against a configured state name.
    pub fn matches(&self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name.trim())
    }
}

impl FromStr for SubscriptionState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let state = match s.trim().to_ascii_lowercase().as_str() {
            "enabled" => Self::Enabled,
            "disabled" => Self::Disabled,
            "deleted" => Self::Deleted,
            "warned" => Self::Warned,
            "expired" => Self::Expired,
            "pastdue" => Self::PastDue,
            _ => Self::Other(s.trim().to_string()),
        };
        Ok(state)
    }
}

impl From<String> for SubscriptionState {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(state) => state,
            Err(never) => match never {},
        }
    }
}

impl From<SubscriptionState> for String {
    fn from(value: SubscriptionState) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A subscription as listed for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    /// Subscription id; matches the `name` of the subscription's [`ScopeNode`]
    pub id: String,
    pub display_name: String,
    pub state: SubscriptionState,
    /// Offer code, e.g. `MS-AZR-0017P`
    pub offer_type: String,
    pub tenant_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, kind: ScopeKind, children: Vec<ScopeNode>) -> ScopeNode {
        ScopeNode {
            id: format!("/{name}"),
            name: name.to_string(),
            display_name: name.to_uppercase(),
            kind,
            parent_id: None,
            children,
        }
    }

    #[test]
    fn iter_is_pre_order_in_child_order() {
        let tree = node(
            "root",
            ScopeKind::ManagementGroup,
            vec![
                node(
                    "a",
                    ScopeKind::ManagementGroup,
                    vec![node("a1", ScopeKind::Subscription, vec![])],
                ),
                node("b", ScopeKind::Subscription, vec![]),
            ],
        );

        let names: Vec<_> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["root", "a", "a1", "b"]);
        assert_eq!(tree.len(), 4);
        assert!(tree.find("/a1").is_some());
    }

    #[test]
    fn retain_subscriptions_keeps_groups_and_drops_unlisted_subscriptions() {
        let tree = node(
            "root",
            ScopeKind::ManagementGroup,
            vec![
                node("keep", ScopeKind::Subscription, vec![]),
                node("drop", ScopeKind::Subscription, vec![]),
                node("empty-mg", ScopeKind::ManagementGroup, vec![]),
            ],
        );
        let qualifying = vec![SubscriptionRecord {
            id: "keep".into(),
            display_name: "Keep".into(),
            state: SubscriptionState::Enabled,
            offer_type: "MS-AZR-0017P".into(),
            tenant_id: "t".into(),
        }];

        let pruned = tree.retain_subscriptions(&qualifying);

        let names: Vec<_> = pruned.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["root", "keep", "empty-mg"]);
        // the source tree is untouched
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn label_falls_back_to_name() {
        let mut n = node("mg-1", ScopeKind::ManagementGroup, vec![]);
        n.display_name = "  ".into();
        assert_eq!(n.label(), "mg-1");
    }

    #[test]
    fn subscription_state_parses_case_insensitively() {
        assert_eq!("pastdue".parse::<SubscriptionState>().unwrap(), SubscriptionState::PastDue);
        assert_eq!("ENABLED".parse::<SubscriptionState>().unwrap(), SubscriptionState::Enabled);
        assert_eq!(
            "Suspended".parse::<SubscriptionState>().unwrap(),
            SubscriptionState::Other("Suspended".into())
        );
        assert!(SubscriptionState::Disabled.matches("disabled"));
    }

    #[test]
    fn subscription_record_serializes_state_as_string() {
        let record = SubscriptionRecord {
            id: "00000000-0000-0000-0000-000000000001".into(),
            display_name: "Prod".into(),
            state: SubscriptionState::Warned,
            offer_type: "MS-AZR-0017P".into(),
            tenant_id: "t".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["state"], "Warned");
        assert_eq!(json["offerType"], "MS-AZR-0017P");

        let back: SubscriptionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
