use crate::graphs::sort::{self, IndexSlices};
use crate::graphs::{AcyclicGraphDepthAnalysis, DepthInfo, DirectedGraph, GraphError, NodeIndex};

use tracing::trace;

/// End boundaries of one depth layer of an [`AcyclicDirectedGraph`].
///
/// The nodes of layer `d` span from the previous layer's
/// `end_node_index` (0 for the first) up to this layer's, and
/// likewise for connections leaving those nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerInfo {
    pub end_node_index: usize,
    pub end_connection_index: usize,
}

/// A [`DirectedGraph`] whose node indexes are ordered by depth.
///
/// Inputs keep the first indexes, and every other node is
/// numbered after all shallower nodes, ties broken by the
/// index the node had before reordering. Evaluating nodes in
/// index order (and connections in storage order) therefore
/// always evaluates a node after everything feeding into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcyclicDirectedGraph {
    graph: DirectedGraph,
    node_depths: Box<[usize]>,
    layers: Box<[LayerInfo]>,
    output_node_indexes: Box<[NodeIndex]>,
    connection_index_map: Box<[usize]>,
}

impl AcyclicDirectedGraph {
    /// Returns the underlying graph.
    pub fn graph(&self) -> &DirectedGraph {
        &self.graph
    }

    /// Returns the depth of every node, by (reordered) node index.
    /// Depths never decrease with index.
    pub fn node_depths(&self) -> &[usize] {
        &self.node_depths
    }

    pub fn depth_of(&self, node: NodeIndex) -> usize {
        self.node_depths[node.0]
    }

    /// Returns one entry per depth, from depth 0 up.
    pub fn layers(&self) -> &[LayerInfo] {
        &self.layers
    }

    /// Returns the index of each output node, in output id order.
    ///
    /// Output nodes do not keep contiguous indexes after depth
    /// ordering, so this is how their values are located.
    pub fn output_node_indexes(&self) -> &[NodeIndex] {
        &self.output_node_indexes
    }

    /// Returns, for each graph connection, the position of the
    /// gene it was compiled from.
    pub fn connection_index_map(&self) -> &[usize] {
        &self.connection_index_map
    }
}

impl AsRef<DirectedGraph> for AcyclicDirectedGraph {
    fn as_ref(&self) -> &DirectedGraph {
        &self.graph
    }
}

/// The result of depth ordering a graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthOrderedGraph {
    pub graph: AcyclicDirectedGraph,
    /// Depths by node index *before* reordering.
    pub depth_info: DepthInfo,
    /// The reordered index of every node, by index before reordering.
    pub new_index_by_old: Box<[NodeIndex]>,
}

/// Reorders acyclic [`DirectedGraph`]s into [`AcyclicDirectedGraph`]s.
///
/// The builder keeps its working memory between calls.
///
/// # Examples
/// ```
/// use oxineat_graph::graphs::{AcyclicGraphBuilder, DirectedGraph, NodeIndex};
///
/// // Inputs 0 and 1, output 2, hidden node 3.
/// // 0 -> 2, 0 -> 3, 1 -> 3, 3 -> 2
/// let graph = DirectedGraph::new(
///     2, 1, 4,
///     vec![NodeIndex(0), NodeIndex(0), NodeIndex(1), NodeIndex(3)],
///     vec![NodeIndex(2), NodeIndex(3), NodeIndex(3), NodeIndex(2)],
/// );
///
/// let ordered = AcyclicGraphBuilder::new().build(graph).unwrap();
///
/// // The hidden node now precedes the deeper output node.
/// assert_eq!(&ordered.new_index_by_old[..], &[0, 1, 3, 2].map(NodeIndex));
/// assert_eq!(ordered.graph.output_node_indexes(), &[NodeIndex(3)]);
/// assert_eq!(ordered.graph.connection_index_map(), &[1, 0, 2, 3]);
/// ```
#[derive(Debug, Default)]
pub struct AcyclicGraphBuilder {
    depth_analysis: AcyclicGraphDepthAnalysis,
    node_order: Vec<usize>,
}

impl AcyclicGraphBuilder {
    pub fn new() -> AcyclicGraphBuilder {
        AcyclicGraphBuilder::default()
    }

    /// Depth orders `graph`.
    ///
    /// # Errors
    /// Returns [`GraphError::CyclicGraph`] if `graph` contains a
    /// cycle, and [`GraphError::InputNodeDepth`] if an input node
    /// has incoming connections.
    pub fn build(&mut self, graph: DirectedGraph) -> Result<DepthOrderedGraph, GraphError> {
        let depth_info = self.depth_analysis.calculate_node_depths(&graph)?;

        let input_count = graph.input_count();
        let output_count = graph.output_count();
        let total_node_count = graph.total_node_count();
        if let Some((input, depth)) = depth_info.node_depths()[..input_count]
            .iter()
            .enumerate()
            .find(|(_, depth)| **depth != 0)
        {
            return Err(GraphError::InputNodeDepth {
                node: NodeIndex(input),
                depth: *depth,
            });
        }

        let new_index_by_old = self.node_order_by_depth(&depth_info);

        let (mut sources, mut targets) = graph.into_connections();
        for node in sources.iter_mut().chain(targets.iter_mut()) {
            *node = new_index_by_old[node.0];
        }
        let mut connection_index_map: Vec<usize> = (0..sources.len()).collect();
        sort::sort(&mut IndexSlices {
            sources: &mut sources,
            targets: &mut targets,
            connection_index_map: &mut connection_index_map,
        });

        let mut node_depths = vec![0; total_node_count];
        for (old, new) in new_index_by_old.iter().enumerate() {
            node_depths[new.0] = depth_info.node_depths()[old];
        }
        let layers = layer_boundaries(&node_depths, &sources, depth_info.network_depth());
        let output_node_indexes = new_index_by_old[input_count..input_count + output_count].into();

        trace!(
            nodes = total_node_count,
            connections = sources.len(),
            depth = depth_info.network_depth(),
            "depth ordered acyclic graph"
        );

        let graph = DirectedGraph::new(
            input_count,
            output_count,
            total_node_count,
            sources,
            targets,
        );
        Ok(DepthOrderedGraph {
            graph: AcyclicDirectedGraph {
                graph,
                node_depths: node_depths.into_boxed_slice(),
                layers,
                output_node_indexes,
                connection_index_map: connection_index_map.into_boxed_slice(),
            },
            depth_info,
            new_index_by_old,
        })
    }

    // Orders nodes by (depth, index) and returns each node's position.
    fn node_order_by_depth(&mut self, depth_info: &DepthInfo) -> Box<[NodeIndex]> {
        let depths = depth_info.node_depths();
        self.node_order.clear();
        self.node_order.extend(0..depths.len());
        self.node_order
            .sort_unstable_by_key(|node| (depths[*node], *node));

        let mut new_index_by_old = vec![NodeIndex(0); depths.len()];
        for (new, old) in self.node_order.iter().enumerate() {
            new_index_by_old[*old] = NodeIndex(new);
        }
        new_index_by_old.into_boxed_slice()
    }
}

fn layer_boundaries(
    node_depths: &[usize],
    sources: &[NodeIndex],
    network_depth: usize,
) -> Box<[LayerInfo]> {
    let mut layers = Vec::with_capacity(network_depth);
    let mut end_node_index = 0;
    let mut end_connection_index = 0;
    for depth in 0..network_depth {
        while end_node_index < node_depths.len() && node_depths[end_node_index] == depth {
            end_node_index += 1;
        }
        while end_connection_index < sources.len()
            && node_depths[sources[end_connection_index].0] == depth
        {
            end_connection_index += 1;
        }
        layers.push(LayerInfo {
            end_node_index,
            end_connection_index,
        });
    }
    layers.into_boxed_slice()
}
