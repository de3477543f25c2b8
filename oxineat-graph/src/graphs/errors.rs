use crate::graphs::NodeIndex;

use thiserror::Error;

/// An error type indicating a failure to compile
/// a genome's connections into an acyclic graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The connections form at least one cycle. Holds the
    /// number of nodes that could not be assigned a depth.
    #[error("cyclic connectivity in acyclic graph, {unresolved_nodes} nodes left without a depth")]
    CyclicGraph { unresolved_nodes: usize },
    /// An input node has incoming connections and would
    /// not be evaluated first.
    #[error("input node {node} at depth {depth}")]
    InputNodeDepth { node: NodeIndex, depth: usize },
}
