//! Dense, array-backed directed graphs compiled from genomes,
//! and the algorithms that build and inspect them.
mod acyclic;
mod cycle_check;
mod depth;
mod directed_graph;
mod errors;
mod node_id_map;
pub(crate) mod sort;

pub use acyclic::{AcyclicDirectedGraph, AcyclicGraphBuilder, DepthOrderedGraph, LayerInfo};
pub use cycle_check::{CyclicConnectionCheck, CyclicGraphCheck};
pub use depth::{AcyclicGraphDepthAnalysis, DepthInfo};
pub use directed_graph::DirectedGraph;
pub use errors::GraphError;
pub use node_id_map::{DictionaryNodeIdMap, IdentityNodeIdMap, NodeIdMap, NodeIndexMap};

use serde::{Deserialize, Serialize};

use std::fmt;

/// Graph-space node index.
///
/// Node indexes are dense: a graph of `n` nodes uses exactly
/// the indexes `[0, n)`. Inputs always take the first indexes,
/// in id order.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
