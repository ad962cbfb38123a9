//! Parent assignment inside the working set.

use std::collections::{BTreeMap, BTreeSet};

use scion_core::SeedTerm;
use scion_hierarchy::{top_ancestors, AdjacencyMap};

/// Decide the parents asserted for every working-set term. Per-term
/// priority: an override parent wins outright, even when hierarchy is
/// suppressed and even if that parent lies outside the module; suppression
/// asserts nothing; otherwise the nearest working-set ancestors are used,
/// skipping self-edges. Every term gets an entry, parentless terms an empty
/// one.
pub(crate) fn assign_parents(
    working: &BTreeSet<String>,
    seeds: &BTreeMap<String, SeedTerm>,
    closure: &AdjacencyMap,
    suppress_hierarchy: bool,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut assigned = BTreeMap::new();
    for term in working {
        let mut parents = BTreeSet::new();
        let override_parent = seeds.get(term).and_then(|details| details.parent.clone());
        if let Some(parent) = override_parent {
            parents.insert(parent);
        } else if !suppress_hierarchy {
            for ancestor in top_ancestors(closure, term, working) {
                if ancestor != *term && working.contains(&ancestor) {
                    parents.insert(ancestor);
                }
            }
        }
        assigned.insert(term.clone(), parents);
    }
    assigned
}
