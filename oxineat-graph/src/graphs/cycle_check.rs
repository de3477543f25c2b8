use crate::graphs::{DirectedGraph, NodeIndex};

use tracing::debug;

/// Initial bit capacity of the working bitmaps.
const INITIAL_CAPACITY: usize = 1024;

/// A fixed-capacity bit set over node indexes.
#[derive(Clone, Debug, Default)]
struct Bitmap {
    words: Vec<u64>,
}

impl Bitmap {
    fn capacity(&self) -> usize {
        self.words.len() * 64
    }

    /// Grows the bitmap to the next power of two at or above `bits`.
    /// Returns whether the bitmap grew. Growing clears all bits.
    fn ensure_capacity(&mut self, bits: usize) -> bool {
        if bits <= self.capacity() {
            return false;
        }
        let capacity = bits.max(INITIAL_CAPACITY).next_power_of_two();
        self.words = vec![0; capacity / 64];
        true
    }

    fn get(&self, bit: usize) -> bool {
        self.words[bit / 64] & (1 << (bit % 64)) != 0
    }

    fn set(&mut self, bit: usize) {
        self.words[bit / 64] |= 1 << (bit % 64);
    }

    fn clear(&mut self, bit: usize) {
        self.words[bit / 64] &= !(1 << (bit % 64));
    }

    /// Clears the first `bits` bits.
    fn reset(&mut self, bits: usize) {
        let words = (bits + 63) / 64;
        self.words[..words].iter_mut().for_each(|w| *w = 0);
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    node: usize,
    next_connection: usize,
}

/// Detects whether a [`DirectedGraph`] contains any cycle.
///
/// A `CyclicGraphCheck` owns its working memory and reuses
/// it across calls; the memory is cleared before each call
/// returns. A single instance must not be shared between
/// threads. Give each worker its own instead.
///
/// # Examples
/// ```
/// use oxineat_graph::graphs::{CyclicGraphCheck, DirectedGraph, NodeIndex};
///
/// let mut check = CyclicGraphCheck::new();
///
/// // 0 -> 2 -> 1
/// let chain = DirectedGraph::new(
///     1, 1, 3,
///     vec![NodeIndex(0), NodeIndex(2)],
///     vec![NodeIndex(2), NodeIndex(1)],
/// );
/// assert!(!check.is_cyclic(&chain));
///
/// // 0 -> 2 -> 1 -> 2
/// let looped = DirectedGraph::new(
///     1, 1, 3,
///     vec![NodeIndex(0), NodeIndex(1), NodeIndex(2)],
///     vec![NodeIndex(2), NodeIndex(2), NodeIndex(1)],
/// );
/// assert!(check.is_cyclic(&looped));
/// ```
#[derive(Debug, Default)]
pub struct CyclicGraphCheck {
    ancestors: Bitmap,
    visited: Bitmap,
    stack: Vec<Frame>,
}

impl CyclicGraphCheck {
    pub fn new() -> CyclicGraphCheck {
        CyclicGraphCheck::default()
    }

    /// Returns whether `graph` contains a cycle, self-loops included.
    pub fn is_cyclic(&mut self, graph: &DirectedGraph) -> bool {
        let node_count = graph.total_node_count();
        let grew = self.ancestors.ensure_capacity(node_count);
        self.visited.ensure_capacity(node_count);
        if grew {
            debug!(
                capacity = self.visited.capacity(),
                "grew cyclic graph check bitmaps"
            );
        }

        let cyclic = (0..node_count)
            .any(|node| !self.visited.get(node) && self.traverse(graph, node));

        self.ancestors.reset(node_count);
        self.visited.reset(node_count);
        self.stack.clear();
        cyclic
    }

    // Depth-first traversal from `root`. A connection into a node
    // on the current path closes a cycle. Nodes already visited
    // through an earlier traversal are known not to lead to one.
    fn traverse(&mut self, graph: &DirectedGraph, root: usize) -> bool {
        let sources = graph.source_indexes();
        let targets = graph.target_indexes();

        self.enter(graph, root);
        while let Some(frame) = self.stack.last_mut() {
            let Frame {
                node,
                next_connection,
            } = *frame;

            if next_connection < sources.len() && sources[next_connection].0 == node {
                frame.next_connection += 1;
                let child = targets[next_connection].0;
                if self.ancestors.get(child) {
                    return true;
                }
                if !self.visited.get(child) {
                    self.enter(graph, child);
                }
            } else {
                self.ancestors.clear(node);
                self.stack.pop();
            }
        }
        false
    }

    fn enter(&mut self, graph: &DirectedGraph, node: usize) {
        self.visited.set(node);
        // Nodes without outgoing connections are dead ends.
        if let Some(first) = graph.first_connection_index(NodeIndex(node)) {
            self.ancestors.set(node);
            self.stack.push(Frame {
                node,
                next_connection: first,
            });
        }
    }
}

/// Detects whether adding a single connection to
/// an existing [`DirectedGraph`] would form a cycle.
///
/// Like [`CyclicGraphCheck`], an instance reuses its
/// working memory and belongs to a single thread.
///
/// # Examples
/// ```
/// use oxineat_graph::graphs::{CyclicConnectionCheck, DirectedGraph, NodeIndex};
///
/// // 0 -> 2 -> 1
/// let graph = DirectedGraph::new(
///     1, 1, 3,
///     vec![NodeIndex(0), NodeIndex(2)],
///     vec![NodeIndex(2), NodeIndex(1)],
/// );
/// let mut check = CyclicConnectionCheck::new();
///
/// assert!(check.is_connection_cyclic(&graph, NodeIndex(1), NodeIndex(0)));
/// assert!(check.is_connection_cyclic(&graph, NodeIndex(2), NodeIndex(2)));
/// assert!(!check.is_connection_cyclic(&graph, NodeIndex(0), NodeIndex(1)));
/// ```
#[derive(Debug, Default)]
pub struct CyclicConnectionCheck {
    visited: Bitmap,
    stack: Vec<NodeIndex>,
}

impl CyclicConnectionCheck {
    pub fn new() -> CyclicConnectionCheck {
        CyclicConnectionCheck::default()
    }

    /// Returns whether the connection `source -> target` would close
    /// a cycle in `graph`, i.e. whether `source` is reachable from
    /// `target`. Self-loops are always cyclic.
    ///
    /// # Panics
    /// This function panics if either endpoint is not in the graph.
    pub fn is_connection_cyclic(
        &mut self,
        graph: &DirectedGraph,
        source: NodeIndex,
        target: NodeIndex,
    ) -> bool {
        if source == target {
            return true;
        }

        let node_count = graph.total_node_count();
        assert!(
            source.0 < node_count && target.0 < node_count,
            "connection {}->{} outside of graph with {} nodes",
            source,
            target,
            node_count
        );
        if self.visited.ensure_capacity(node_count) {
            debug!(
                capacity = self.visited.capacity(),
                "grew cyclic connection check bitmap"
            );
        }

        let cyclic = self.reaches(graph, target, source);

        self.visited.reset(node_count);
        self.stack.clear();
        cyclic
    }

    fn reaches(&mut self, graph: &DirectedGraph, start: NodeIndex, end: NodeIndex) -> bool {
        self.visited.set(start.0);
        self.stack.push(start);
        while let Some(node) = self.stack.pop() {
            for &child in graph.connections_of(node) {
                if child == end {
                    return true;
                }
                if !self.visited.get(child.0) {
                    self.visited.set(child.0);
                    self.stack.push(child);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(node_count: usize, connections: &[(usize, usize)]) -> DirectedGraph {
        let mut connections = connections.to_vec();
        connections.sort_unstable();
        DirectedGraph::new(
            1,
            1,
            node_count,
            connections.iter().map(|c| NodeIndex(c.0)).collect(),
            connections.iter().map(|c| NodeIndex(c.1)).collect(),
        )
    }

    #[test]
    fn bitmap_growth_and_reset() {
        let mut bitmap = Bitmap::default();
        assert!(bitmap.ensure_capacity(10));
        assert_eq!(bitmap.capacity(), INITIAL_CAPACITY);
        assert!(!bitmap.ensure_capacity(INITIAL_CAPACITY));
        assert!(bitmap.ensure_capacity(INITIAL_CAPACITY + 1));
        assert_eq!(bitmap.capacity(), 2 * INITIAL_CAPACITY);

        bitmap.set(3);
        bitmap.set(64);
        bitmap.set(1500);
        assert!(bitmap.get(64));
        bitmap.clear(64);
        assert!(!bitmap.get(64));
        bitmap.reset(100);
        assert!(!bitmap.get(3));
        assert!(bitmap.get(1500));
    }

    #[test]
    fn acyclic_graphs() {
        let mut check = CyclicGraphCheck::new();
        assert!(!check.is_cyclic(&graph(2, &[])));
        assert!(!check.is_cyclic(&graph(4, &[(0, 2), (0, 3), (2, 1), (3, 1), (2, 3)])));
        // Diamond reached through a node already visited from another root.
        assert!(!check.is_cyclic(&graph(5, &[(3, 4), (4, 1), (0, 4)])));
    }

    #[test]
    fn cyclic_graphs() {
        let mut check = CyclicGraphCheck::new();
        assert!(check.is_cyclic(&graph(3, &[(2, 2)])));
        assert!(check.is_cyclic(&graph(4, &[(0, 2), (2, 3), (3, 2)])));
        // Cycle unreachable from the inputs.
        assert!(check.is_cyclic(&graph(5, &[(0, 1), (3, 4), (4, 3)])));
    }

    #[test]
    fn state_is_cleared_between_calls() {
        let mut check = CyclicGraphCheck::new();
        let cyclic = graph(4, &[(0, 2), (2, 3), (3, 0)]);
        let acyclic = graph(4, &[(0, 2), (2, 3), (3, 1)]);
        for _ in 0..3 {
            assert!(check.is_cyclic(&cyclic));
            assert!(!check.is_cyclic(&acyclic));
        }
    }

    #[test]
    fn large_graphs_grow_working_memory() {
        let n = 5000;
        let chain: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        let mut check = CyclicGraphCheck::new();
        assert!(!check.is_cyclic(&graph(n, &chain)));

        let mut looped = chain;
        looped.push((n - 1, 0));
        assert!(check.is_cyclic(&graph(n, &looped)));
        assert!(!check.is_cyclic(&graph(3, &[(0, 2), (2, 1)])));
    }

    #[test]
    fn cyclic_connections() {
        let g = graph(6, &[(0, 2), (2, 3), (3, 4), (4, 1), (5, 1)]);
        let mut check = CyclicConnectionCheck::new();
        assert!(check.is_connection_cyclic(&g, NodeIndex(4), NodeIndex(2)));
        assert!(check.is_connection_cyclic(&g, NodeIndex(1), NodeIndex(0)));
        assert!(check.is_connection_cyclic(&g, NodeIndex(5), NodeIndex(5)));
        assert!(!check.is_connection_cyclic(&g, NodeIndex(2), NodeIndex(4)));
        assert!(!check.is_connection_cyclic(&g, NodeIndex(5), NodeIndex(3)));
        assert!(check.is_connection_cyclic(&g, NodeIndex(1), NodeIndex(5)));
        assert!(!check.is_connection_cyclic(&g, NodeIndex(3), NodeIndex(5)));
    }
}
