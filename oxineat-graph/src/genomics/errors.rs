use crate::genomics::NodeId;
use crate::graphs::NodeIndex;

use thiserror::Error;

/// An error type indicating that a genome's
/// stored structures are inconsistent with each
/// other or with its metadata.
///
/// Genomes produced by a [`GenomeBuilder`] are always
/// consistent; these errors surface defects in code
/// that assembles or modifies genomes by other means.
///
/// [`GenomeBuilder`]: crate::genomics::GenomeBuilder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The three gene arrays differ in length.
    #[error("gene arrays of unequal length: {connections} connections, {weights} weights, {innovations} innovations")]
    GeneArrayLengthMismatch {
        connections: usize,
        weights: usize,
        innovations: usize,
    },
    /// The genes are not in strictly ascending connection order.
    #[error("connection genes out of order at position {index}")]
    UnsortedGenes { index: usize },
    /// The hidden node id list is unsorted, contains a
    /// fixed node id, or disagrees with the genes.
    #[error("hidden node ids do not match the connection genes")]
    InvalidHiddenNodeIds,
    /// The graph's input or output count disagrees
    /// with the genome's metadata.
    #[error("graph with {inputs} inputs and {outputs} outputs, expected {expected_inputs} inputs and {expected_outputs} outputs")]
    InputOutputCountMismatch {
        expected_inputs: usize,
        expected_outputs: usize,
        inputs: usize,
        outputs: usize,
    },
    /// The graph or the node id map do not hold
    /// one node per fixed and hidden node.
    #[error("expected {expected} nodes, graph has {graph} and node id map has {map}")]
    NodeCountMismatch {
        expected: usize,
        graph: usize,
        map: usize,
    },
    /// The graph does not hold one connection per gene.
    #[error("{genes} connection genes compiled into {graph} graph connections")]
    ConnectionCountMismatch { genes: usize, graph: usize },
    /// The graph's connections are not in strictly
    /// ascending (source, target) order.
    #[error("graph connections out of order at position {index}")]
    UnsortedGraph { index: usize },
    /// The compiled graph is not of the kind the
    /// genome's metadata calls for.
    #[error("compiled graph kind does not match metadata with is_acyclic = {is_acyclic}")]
    GraphKindMismatch { is_acyclic: bool },
    /// A gene's endpoints do not map to the endpoints
    /// of its graph connection.
    #[error("gene {connection} does not map to its graph connection")]
    ConnectionMismatch { connection: usize },
    /// The gene index by innovation is not a permutation
    /// of gene positions in ascending innovation order.
    #[error("gene index by innovation is inconsistent with the genes")]
    InnovationIndexMismatch,
    /// The connection index map is not a permutation
    /// of gene positions.
    #[error("connection index map is not a permutation of gene positions")]
    InvalidConnectionIndexMap,
    /// Depth info covers fewer nodes than there are inputs.
    #[error("depth info of {nodes} nodes cannot hold {inputs} inputs")]
    MissingInputDepths { inputs: usize, nodes: usize },
    /// An input node of an acyclic graph is not at depth 0.
    #[error("input node {node} at depth {depth}")]
    InputNodeDepth { node: NodeIndex, depth: usize },
    /// A node's recorded depth differs between the
    /// depth info and the depth-ordered graph.
    #[error("depth of node {node} is inconsistent with its depth-ordered index")]
    NodeDepthMismatch { node: NodeId },
    /// Node depths do not increase monotonically
    /// with node index.
    #[error("node {node} is shallower than the node before it")]
    NodeOrderMismatch { node: NodeIndex },
    /// A connection does not go strictly deeper.
    #[error("connection {connection} goes from depth {source_depth} to depth {target_depth}")]
    NonIncreasingDepth {
        connection: usize,
        source_depth: usize,
        target_depth: usize,
    },
    /// An output node's recorded index differs from its mapped index.
    #[error("output node {output} has an inconsistent index")]
    OutputIndexMismatch { output: NodeId },
    /// A layer boundary is inconsistent with node
    /// and connection depths.
    #[error("layer {layer} has inconsistent boundaries")]
    LayerMismatch { layer: usize },
    /// A graph that should be acyclic contains a cycle.
    #[error("cycle in acyclic graph")]
    CyclicGraph,
}
