//! Directory names for sibling scopes
//!
//! A scope's directory is named after its display label. When siblings
//! share a label, each of them gets its short name as a parenthetical
//! suffix. Names are compared ignoring case because the state tree is
//! checked out on case-insensitive filesystems too. The metadata marker
//! name is reserved: a scope labelled like it collides with the marker
//! and is suffixed the same way.

use std::collections::{HashMap, HashSet};

use mirror_fs::{StatePath, sanitize_segment};

use crate::scope::ScopeNode;

/// Assign one directory name per sibling, in sibling order.
///
/// The result depends only on the sibling sequence, so unchanged input
/// always yields the same names. Names are pairwise distinct (ignoring
/// case) and a suffixed name never takes a name a sibling already owns.
pub fn assign_directory_names(siblings: &[ScopeNode]) -> Vec<String> {
    let bases: Vec<String> = siblings.iter().map(|node| sanitize_segment(node.label())).collect();

    let marker = fold(StatePath::MetadataMarker.as_str());
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for base in &bases {
        *occurrences.entry(fold(base)).or_default() += 1;
    }
    let keeps_plain_name = |base: &str| {
        let folded = fold(base);
        folded != marker && occurrences[&folded] == 1
    };

    // The marker and unique labels are reserved first
    let mut taken: HashSet<String> = bases
        .iter()
        .filter(|base| keeps_plain_name(base.as_str()))
        .map(|base| fold(base))
        .collect();
    taken.insert(marker.clone());

    siblings
        .iter()
        .zip(&bases)
        .map(|(node, base)| {
            if keeps_plain_name(base.as_str()) {
                return base.clone();
            }
            let suffix = sanitize_segment(&node.name);
            let mut candidate = format!("{base} ({suffix})");
            let mut counter = 2;
            while !taken.insert(fold(&candidate)) {
                candidate = format!("{base} ({suffix}-{counter})");
                counter += 1;
            }
            candidate
        })
        .collect()
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}
