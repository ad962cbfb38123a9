//! Frontier reduction over hierarchy closures.
//!
//! `top_ancestors` and `capped_ancestors` walk an ancestor closure (child to
//! parents); `bottom_descendants` and `all_descendants` walk a descendant
//! closure (parent to children). A node absent from the closure is a root or
//! a leaf, not an error.

use std::collections::BTreeSet;

use scion_core::vocab::CLASS_ROOT;

use crate::AdjacencyMap;

/// Nearest stopping points above `term`: frontier members met on the way up,
/// plus any node whose parent is the class root or that has no parents at
/// all, which is its own top ancestor. Every asserted parent is followed, so
/// multiple inheritance yields multiple stopping points.
pub fn top_ancestors(
    closure: &AdjacencyMap,
    term: &str,
    frontier: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut pending = vec![term.to_string()];
    while let Some(node) = pending.pop() {
        if !visited.insert(node.clone()) {
            continue;
        }
        let parents = match closure.get(&node) {
            Some(parents) if !parents.is_empty() => parents,
            _ => {
                found.insert(node);
                continue;
            }
        };
        for parent in parents {
            if parent == CLASS_ROOT {
                found.insert(node.clone());
            } else if frontier.contains(parent) {
                found.insert(parent.clone());
            } else {
                pending.push(parent.clone());
            }
        }
    }
    found
}

/// Every ancestor strictly between `term` and the frontier: frontier members
/// are included and end their branch, the class root is skipped entirely.
/// With an empty frontier this is the full ancestor set below the root.
pub fn capped_ancestors(
    closure: &AdjacencyMap,
    frontier: &BTreeSet<String>,
    term: &str,
) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut pending = vec![term.to_string()];
    while let Some(node) = pending.pop() {
        if !visited.insert(node.clone()) {
            continue;
        }
        let Some(parents) = closure.get(&node) else {
            continue;
        };
        for parent in parents {
            if parent == CLASS_ROOT {
                continue;
            }
            found.insert(parent.clone());
            if !frontier.contains(parent) {
                pending.push(parent.clone());
            }
        }
    }
    found
}

/// Leaf descendants below `term`: nodes with no children of their own. A
/// term with no children is its own bottom descendant.
pub fn bottom_descendants(closure: &AdjacencyMap, term: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut pending = vec![term.to_string()];
    while let Some(node) = pending.pop() {
        if !visited.insert(node.clone()) {
            continue;
        }
        match closure.get(&node) {
            Some(children) if !children.is_empty() => {
                pending.extend(children.iter().cloned());
            }
            _ => {
                found.insert(node);
            }
        }
    }
    found
}

/// The full downward closure below `term`, intermediates included, `term`
/// itself excluded.
pub fn all_descendants(closure: &AdjacencyMap, term: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut pending = vec![term.to_string()];
    while let Some(node) = pending.pop() {
        if !visited.insert(node.clone()) {
            continue;
        }
        if let Some(children) = closure.get(&node) {
            for child in children {
                found.insert(child.clone());
                pending.push(child.clone());
            }
        }
    }
    found
}
