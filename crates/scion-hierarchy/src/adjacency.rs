//! Adjacency maps for hierarchy closures.

use std::collections::{BTreeMap, BTreeSet};

/// Edges of one closure direction: node to the set of nodes one hop away
/// (parents for an ancestor closure, children for a descendant closure).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyMap {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl AdjacencyMap {
    pub fn new() -> Self {
        AdjacencyMap::default()
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.edges.entry(from.into()).or_default().insert(to.into());
    }

    /// Nodes one hop away, or `None` for a node absent from the closure.
    pub fn get(&self, node: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(node)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.edges.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.edges.iter()
    }
}

impl<F, T> FromIterator<(F, T)> for AdjacencyMap
where
    F: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (F, T)>>(iter: I) -> Self {
        let mut map = AdjacencyMap::new();
        for (from, to) in iter {
            map.insert(from, to);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut map = AdjacencyMap::new();
        map.insert("A", "B");
        map.insert("A", "C");
        map.insert("A", "B");

        let targets = map.get("A").unwrap();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains("B") && targets.contains("C"));
        assert!(map.get("B").is_none());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn collects_from_edge_pairs() {
        let map: AdjacencyMap = [("A", "B"), ("B", "C"), ("A", "D")].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert!(map.contains("A"));
        assert_eq!(map.get("B").unwrap().len(), 1);
    }
}
