use crate::genomics::DirectedConnection;
use crate::graphs::{NodeIdMap, NodeIndex};

use std::ops::Range;

/// A directed graph over dense node indexes.
///
/// Connections are stored as two parallel arrays of source and
/// target indexes, sorted by source and then by target. Alongside
/// them, a per-node table records the position of each node's first
/// outgoing connection, so that a node's targets form one contiguous
/// run of the target array.
///
/// # Examples
/// ```
/// use oxineat_graph::graphs::{DirectedGraph, NodeIndex};
///
/// // 0 -> 2, 0 -> 3, 1 -> 3, 3 -> 2
/// let graph = DirectedGraph::new(
///     2,
///     1,
///     4,
///     vec![NodeIndex(0), NodeIndex(0), NodeIndex(1), NodeIndex(3)],
///     vec![NodeIndex(2), NodeIndex(3), NodeIndex(3), NodeIndex(2)],
/// );
///
/// assert_eq!(graph.connections_of(NodeIndex(0)), &[NodeIndex(2), NodeIndex(3)]);
/// assert_eq!(graph.first_connection_index(NodeIndex(3)), Some(3));
/// assert_eq!(graph.first_connection_index(NodeIndex(2)), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectedGraph {
    input_count: usize,
    output_count: usize,
    total_node_count: usize,
    sources: Box<[NodeIndex]>,
    targets: Box<[NodeIndex]>,
    first_connection_by_node: Box<[Option<usize>]>,
}

impl DirectedGraph {
    /// Assembles a graph out of connection arrays
    /// already sorted by (source, target).
    ///
    /// # Panics
    /// This function panics if the connection arrays
    /// differ in length, or if any index is outside of
    /// `[0, total_node_count)`.
    pub fn new(
        input_count: usize,
        output_count: usize,
        total_node_count: usize,
        sources: Vec<NodeIndex>,
        targets: Vec<NodeIndex>,
    ) -> DirectedGraph {
        assert_eq!(
            sources.len(),
            targets.len(),
            "connection source and target arrays of unequal length"
        );
        assert!(
            targets.iter().all(|t| t.0 < total_node_count),
            "connection target outside of graph with {} nodes",
            total_node_count
        );
        debug_assert!(
            sources
                .iter()
                .zip(targets.iter())
                .zip(sources.iter().zip(targets.iter()).skip(1))
                .all(|(a, b)| a <= b),
            "unsorted graph connections"
        );

        let first_connection_by_node = first_connection_indexes(total_node_count, &sources);
        DirectedGraph {
            input_count,
            output_count,
            total_node_count,
            sources: sources.into_boxed_slice(),
            targets: targets.into_boxed_slice(),
            first_connection_by_node,
        }
    }

    /// Builds a graph by mapping genome-space connections,
    /// sorted by (source id, target id), into graph space.
    ///
    /// `node_id_map` must preserve id order, as maps built by
    /// [`NodeIndexMap::compile`] do. The resulting connection
    /// arrays then remain sorted and stay aligned with the
    /// genome's gene arrays.
    ///
    /// [`NodeIndexMap::compile`]: crate::graphs::NodeIndexMap::compile
    ///
    /// # Panics
    /// This function panics if a connection endpoint is not in the map.
    pub fn from_connections(
        input_count: usize,
        output_count: usize,
        connections: &[DirectedConnection],
        node_id_map: &impl NodeIdMap,
    ) -> DirectedGraph {
        let sources = connections
            .iter()
            .map(|c| node_id_map.map(c.source))
            .collect();
        let targets = connections
            .iter()
            .map(|c| node_id_map.map(c.target))
            .collect();
        DirectedGraph::new(
            input_count,
            output_count,
            node_id_map.count(),
            sources,
            targets,
        )
    }

    /// Returns the number of input nodes.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Returns the number of output nodes.
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Returns the number of nodes, including those without connections.
    pub fn total_node_count(&self) -> usize {
        self.total_node_count
    }

    /// Returns the number of connections.
    pub fn connection_count(&self) -> usize {
        self.sources.len()
    }

    /// Returns the connection source array.
    pub fn source_indexes(&self) -> &[NodeIndex] {
        &self.sources
    }

    /// Returns the connection target array.
    pub fn target_indexes(&self) -> &[NodeIndex] {
        &self.targets
    }

    /// Returns the position of the first connection
    /// leaving `node`, or `None` if it has none.
    ///
    /// # Panics
    /// This function panics if `node` is not in the graph.
    pub fn first_connection_index(&self, node: NodeIndex) -> Option<usize> {
        self.first_connection_by_node[node.0]
    }

    /// Returns the range of connection positions leaving `node`.
    pub fn connection_range(&self, node: NodeIndex) -> Range<usize> {
        match self.first_connection_index(node) {
            Some(start) => {
                let len = self.sources[start..]
                    .iter()
                    .take_while(|source| **source == node)
                    .count();
                start..start + len
            }
            None => 0..0,
        }
    }

    /// Returns the targets of all connections leaving `node`, in ascending order.
    pub fn connections_of(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.targets[self.connection_range(node)]
    }

    pub(crate) fn into_connections(self) -> (Vec<NodeIndex>, Vec<NodeIndex>) {
        (self.sources.into_vec(), self.targets.into_vec())
    }
}

fn first_connection_indexes(node_count: usize, sources: &[NodeIndex]) -> Box<[Option<usize>]> {
    let mut first_connection_by_node = vec![None; node_count];
    for (i, source) in sources.iter().enumerate().rev() {
        first_connection_by_node[source.0] = Some(i);
    }
    first_connection_by_node.into_boxed_slice()
}
