//! Pure hierarchy algorithms over adjacency maps.
//!
//! The store hands closures over as [`AdjacencyMap`]s; everything here is a
//! pure function of that map. All walks are iterative with explicit visited
//! sets, so cyclic or self-referential edges in malformed input terminate
//! instead of recursing forever.

mod adjacency;
mod reduce;

pub use adjacency::AdjacencyMap;
pub use reduce::{all_descendants, bottom_descendants, capped_ancestors, top_ancestors};
