use crate::genomics::NodeId;
use crate::graphs::NodeIndex;

use ahash::RandomState;

use std::collections::HashMap;

/// Translation from genome-space node ids to graph-space node indexes.
pub trait NodeIdMap {
    /// Returns the number of mapped nodes. Mapped
    /// indexes are exactly `[0, count)`.
    fn count(&self) -> usize;

    /// Returns the index of `id`, or `None` if `id` is not mapped.
    fn try_map(&self, id: NodeId) -> Option<NodeIndex>;

    /// Returns the index of `id`.
    ///
    /// # Panics
    /// This function panics if `id` is not mapped.
    fn map(&self, id: NodeId) -> NodeIndex {
        self.try_map(id)
            .unwrap_or_else(|| panic!("unmapped node id {}", id))
    }
}

/// Maps ids `[0, count)` onto the same indexes.
///
/// Used by genomes whose node id space is already dense,
/// i.e. genomes without hidden nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityNodeIdMap {
    count: usize,
}

impl IdentityNodeIdMap {
    pub fn new(count: usize) -> IdentityNodeIdMap {
        IdentityNodeIdMap { count }
    }
}

impl NodeIdMap for IdentityNodeIdMap {
    fn count(&self) -> usize {
        self.count
    }

    fn try_map(&self, id: NodeId) -> Option<NodeIndex> {
        (id.0 < self.count).then(|| NodeIndex(id.0))
    }
}

/// Maps ids `[0, fixed_count)` onto the same indexes,
/// and every other id through a lookup table.
///
/// # Examples
/// ```
/// use oxineat_graph::genomics::NodeId;
/// use oxineat_graph::graphs::{DictionaryNodeIdMap, NodeIdMap, NodeIndex};
///
/// let map = DictionaryNodeIdMap::new(
///     3,
///     [(NodeId(7), NodeIndex(3)), (NodeId(12), NodeIndex(4))].into_iter().collect(),
/// );
///
/// assert_eq!(map.count(), 5);
/// assert_eq!(map.map(NodeId(1)), NodeIndex(1));
/// assert_eq!(map.map(NodeId(12)), NodeIndex(4));
/// assert_eq!(map.try_map(NodeId(5)), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictionaryNodeIdMap {
    fixed_count: usize,
    count: usize,
    index_by_id: HashMap<NodeId, NodeIndex, RandomState>,
}

impl DictionaryNodeIdMap {
    /// Returns a new map. Entries in `index_by_id` take
    /// precedence over the fixed region.
    pub fn new(
        fixed_count: usize,
        index_by_id: HashMap<NodeId, NodeIndex, RandomState>,
    ) -> DictionaryNodeIdMap {
        let overridden = index_by_id
            .keys()
            .filter(|id| id.0 < fixed_count)
            .count();
        DictionaryNodeIdMap {
            fixed_count,
            count: fixed_count + index_by_id.len() - overridden,
            index_by_id,
        }
    }

    /// Returns the size of the region mapped onto itself.
    pub fn fixed_count(&self) -> usize {
        self.fixed_count
    }
}

impl NodeIdMap for DictionaryNodeIdMap {
    fn count(&self) -> usize {
        self.count
    }

    fn try_map(&self, id: NodeId) -> Option<NodeIndex> {
        match self.index_by_id.get(&id) {
            Some(index) => Some(*index),
            None => (id.0 < self.fixed_count).then(|| NodeIndex(id.0)),
        }
    }
}

/// The node id map of a compiled genome.
///
/// Which variant a genome uses depends on its shape:
/// see [`compile`] and [`compile_depth_ordered`].
///
/// [`compile`]: NodeIndexMap::compile
/// [`compile_depth_ordered`]: NodeIndexMap::compile_depth_ordered
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeIndexMap {
    Identity(IdentityNodeIdMap),
    Dictionary(DictionaryNodeIdMap),
}

impl NodeIndexMap {
    /// Returns an order-preserving map in which fixed nodes keep
    /// their ids as indexes and the i-th hidden node is given
    /// index `input_output_count + i`.
    ///
    /// `hidden_node_ids` must be sorted in ascending order.
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::NodeId;
    /// use oxineat_graph::graphs::{NodeIdMap, NodeIndex, NodeIndexMap};
    ///
    /// let map = NodeIndexMap::compile(3, &[]);
    /// assert!(matches!(map, NodeIndexMap::Identity(_)));
    ///
    /// let map = NodeIndexMap::compile(3, &[NodeId(7), NodeId(12)]);
    /// assert_eq!(map.map(NodeId(2)), NodeIndex(2));
    /// assert_eq!(map.map(NodeId(7)), NodeIndex(3));
    /// assert_eq!(map.map(NodeId(12)), NodeIndex(4));
    /// ```
    pub fn compile(input_output_count: usize, hidden_node_ids: &[NodeId]) -> NodeIndexMap {
        if hidden_node_ids.is_empty() {
            return NodeIndexMap::Identity(IdentityNodeIdMap::new(input_output_count));
        }

        let index_by_id = hidden_node_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, NodeIndex(input_output_count + i)))
            .collect();
        NodeIndexMap::Dictionary(DictionaryNodeIdMap::new(input_output_count, index_by_id))
    }

    /// Composes the map produced by [`compile`] with a renumbering
    /// of its indexes, `new_index_by_old`, as produced by depth
    /// ordering an acyclic graph.
    ///
    /// Depth ordering leaves input indexes untouched, so only
    /// inputs remain in the fixed region of the resulting map.
    /// The identity map is kept when renumbering changes nothing.
    ///
    /// [`compile`]: NodeIndexMap::compile
    pub fn compile_depth_ordered(
        input_count: usize,
        output_count: usize,
        hidden_node_ids: &[NodeId],
        new_index_by_old: &[NodeIndex],
    ) -> NodeIndexMap {
        let input_output_count = input_count + output_count;
        debug_assert_eq!(new_index_by_old.len(), input_output_count + hidden_node_ids.len());
        debug_assert!(new_index_by_old[..input_count]
            .iter()
            .enumerate()
            .all(|(i, index)| index.0 == i));

        let unchanged = new_index_by_old
            .iter()
            .enumerate()
            .all(|(i, index)| index.0 == i);
        if hidden_node_ids.is_empty() && unchanged {
            return NodeIndexMap::Identity(IdentityNodeIdMap::new(input_output_count));
        }

        let outputs = (input_count..input_output_count).map(NodeId);
        let hidden = hidden_node_ids.iter().copied();
        let index_by_id = outputs
            .chain(hidden)
            .zip(&new_index_by_old[input_count..])
            .map(|(id, index)| (id, *index))
            .collect();
        NodeIndexMap::Dictionary(DictionaryNodeIdMap::new(input_count, index_by_id))
    }
}

impl NodeIdMap for NodeIndexMap {
    fn count(&self) -> usize {
        match self {
            NodeIndexMap::Identity(map) => map.count(),
            NodeIndexMap::Dictionary(map) => map.count(),
        }
    }

    fn try_map(&self, id: NodeId) -> Option<NodeIndex> {
        match self {
            NodeIndexMap::Identity(map) => map.try_map(id),
            NodeIndexMap::Dictionary(map) => map.try_map(id),
        }
    }
}
