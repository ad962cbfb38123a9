//! Related-entity expansion: seed directives pull neighbors into the
//! working set.

use std::collections::{BTreeMap, BTreeSet};

use scion_core::{Intermediates, RelatedDirective, SeedTerm};
use scion_hierarchy::{
    all_descendants, bottom_descendants, capped_ancestors, top_ancestors, AdjacencyMap,
};
use scion_store::StatementStore;

use crate::ExtractError;

/// Expansion that needs no ancestor closure: one-hop parents and children
/// per seed, plus a single batched descendant closure shared by every
/// descendants seed.
pub(crate) fn downward_expansion(
    store: &StatementStore,
    seeds: &BTreeMap<String, SeedTerm>,
    intermediates: Intermediates,
) -> Result<BTreeSet<String>, ExtractError> {
    let mut added = BTreeSet::new();
    for (term, details) in seeds {
        match details.related {
            Some(RelatedDirective::Parents) => added.extend(store.parents_of(term)?),
            Some(RelatedDirective::Children) => added.extend(store.children_of(term)?),
            _ => {}
        }
    }

    let descendant_seeds: Vec<&str> = seeds
        .iter()
        .filter(|(_, details)| details.related == Some(RelatedDirective::Descendants))
        .map(|(term, _)| term.as_str())
        .collect();
    if !descendant_seeds.is_empty() {
        let closure: AdjacencyMap = store
            .descendants_of(descendant_seeds.iter().copied())?
            .into_iter()
            .collect();
        for term in &descendant_seeds {
            added.extend(match intermediates {
                Intermediates::All => all_descendants(&closure, term),
                Intermediates::None => bottom_descendants(&closure, term),
            });
        }
    }
    Ok(added)
}

/// Ancestor expansion against an already-computed upward closure. The
/// frontier is the seed id set, so one seed's lineage stops at another seed.
pub(crate) fn upward_expansion(
    closure: &AdjacencyMap,
    seeds: &BTreeMap<String, SeedTerm>,
    frontier: &BTreeSet<String>,
    intermediates: Intermediates,
) -> BTreeSet<String> {
    let mut added = BTreeSet::new();
    for (term, details) in seeds {
        if details.related != Some(RelatedDirective::Ancestors) {
            continue;
        }
        added.extend(match intermediates {
            Intermediates::All => capped_ancestors(closure, frontier, term),
            Intermediates::None => top_ancestors(closure, term, frontier),
        });
    }
    added
}
