use crate::graphs::{DirectedGraph, GraphError, NodeIndex};

/// Node depths of an acyclic graph.
///
/// A node's depth is the length of the longest path reaching
/// it from any node without incoming connections, all of which
/// sit at depth 0. Every connection therefore goes from a node
/// to a strictly deeper one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthInfo {
    network_depth: usize,
    node_depths: Box<[usize]>,
}

impl DepthInfo {
    pub(crate) fn new(node_depths: Box<[usize]>) -> DepthInfo {
        let network_depth = node_depths.iter().copied().max().unwrap_or(0) + 1;
        DepthInfo {
            network_depth,
            node_depths,
        }
    }

    /// Returns the number of distinct depths, i.e. one
    /// more than the depth of the deepest node.
    pub fn network_depth(&self) -> usize {
        self.network_depth
    }

    /// Returns the depth of every node, by node index.
    pub fn node_depths(&self) -> &[usize] {
        &self.node_depths
    }

    /// Returns the depth of `node`.
    pub fn depth_of(&self, node: NodeIndex) -> usize {
        self.node_depths[node.0]
    }
}

/// Computes node depths of acyclic [`DirectedGraph`]s.
///
/// Nodes are visited in topological order, each one only after
/// all connections into it have been followed. Nodes on a cycle
/// are never reached, so cyclic graphs are reported as errors.
///
/// The analysis keeps its working memory between calls.
///
/// # Examples
/// ```
/// use oxineat_graph::graphs::{AcyclicGraphDepthAnalysis, DirectedGraph, NodeIndex};
///
/// // 0 -> 3 -> 2, 1 -> 2
/// let graph = DirectedGraph::new(
///     2, 1, 4,
///     vec![NodeIndex(0), NodeIndex(1), NodeIndex(3)],
///     vec![NodeIndex(3), NodeIndex(2), NodeIndex(2)],
/// );
///
/// let depth_info = AcyclicGraphDepthAnalysis::new()
///     .calculate_node_depths(&graph)
///     .unwrap();
///
/// assert_eq!(depth_info.node_depths(), &[0, 0, 2, 1]);
/// assert_eq!(depth_info.network_depth(), 3);
/// ```
#[derive(Debug, Default)]
pub struct AcyclicGraphDepthAnalysis {
    in_degrees: Vec<usize>,
    queue: Vec<usize>,
}

impl AcyclicGraphDepthAnalysis {
    pub fn new() -> AcyclicGraphDepthAnalysis {
        AcyclicGraphDepthAnalysis::default()
    }

    /// Returns the depth of every node of `graph`.
    ///
    /// # Errors
    /// Returns [`GraphError::CyclicGraph`] if `graph` contains a cycle.
    pub fn calculate_node_depths(
        &mut self,
        graph: &DirectedGraph,
    ) -> Result<DepthInfo, GraphError> {
        let node_count = graph.total_node_count();
        let AcyclicGraphDepthAnalysis { in_degrees, queue } = self;

        in_degrees.clear();
        in_degrees.resize(node_count, 0);
        for target in graph.target_indexes() {
            in_degrees[target.0] += 1;
        }

        queue.clear();
        queue.extend((0..node_count).filter(|node| in_degrees[*node] == 0));

        let mut node_depths = vec![0; node_count];
        let mut next = 0;
        while let Some(&node) = queue.get(next) {
            next += 1;
            let child_depth = node_depths[node] + 1;
            for child in graph.connections_of(NodeIndex(node)) {
                let child = child.0;
                node_depths[child] = node_depths[child].max(child_depth);
                in_degrees[child] -= 1;
                if in_degrees[child] == 0 {
                    queue.push(child);
                }
            }
        }

        if queue.len() < node_count {
            return Err(GraphError::CyclicGraph {
                unresolved_nodes: node_count - queue.len(),
            });
        }
        Ok(DepthInfo::new(node_depths.into_boxed_slice()))
    }
}
