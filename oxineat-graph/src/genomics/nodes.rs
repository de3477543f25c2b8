use crate::genomics::DirectedConnection;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use std::collections::HashSet;
use std::fmt;

/// An ActivationType represents the type
/// of activation function a genome's network
/// equivalent will use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ActivationType {
    // 1 / (1 + exp(-4.9x))
    Sigmoid,
    // x
    Identity,
    // 0   if x < 0
    // x   if x ≥ 0
    ReLU,
    // exp(-x²)
    Gaussian,
    // sin(πx)
    Sinusoidal,
}

impl ActivationType {
    /// Applies the activation function to an input sum.
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::ActivationType;
    ///
    /// assert_eq!(ActivationType::Identity.activate(-2.0), -2.0);
    /// assert_eq!(ActivationType::ReLU.activate(-2.0), 0.0);
    /// assert_eq!(ActivationType::Sigmoid.activate(0.0), 0.5);
    /// ```
    pub fn activate(self, input_sum: f32) -> f32 {
        match self {
            ActivationType::Sigmoid => 1.0 / (1.0 + (-4.9 * input_sum).exp()),
            ActivationType::Identity => input_sum,
            ActivationType::ReLU => input_sum.max(0.0),
            ActivationType::Gaussian => (-input_sum.powf(2.0)).exp(),
            ActivationType::Sinusoidal => (input_sum * std::f32::consts::PI).sin(),
        }
    }
}

/// Genome-space node identifier.
///
/// Input and output nodes take the first ids of the id space,
/// hidden nodes take historically-assigned ids above them.
/// Hidden node ids are therefore sparse: a genome with three
/// hidden nodes may well use ids 7, 12 and 40.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collects the ids of all hidden nodes referenced by `connections`,
/// i.e. those at or above `input_output_count`, in ascending order
/// and without duplicates.
///
/// `working_set` is scratch space; it is cleared before and
/// after use, and kept around by callers to avoid reallocating.
///
/// # Examples
/// ```
/// use oxineat_graph::genomics::{hidden_node_ids, DirectedConnection, NodeId};
/// use std::collections::HashSet;
///
/// let connections = [
///     DirectedConnection::new(0, 12),
///     DirectedConnection::new(12, 7),
///     DirectedConnection::new(7, 2),
/// ];
/// let mut working_set = HashSet::default();
///
/// let hidden = hidden_node_ids(&connections, 3, &mut working_set);
/// assert_eq!(&hidden[..], &[NodeId(7), NodeId(12)]);
/// ```
pub fn hidden_node_ids(
    connections: &[DirectedConnection],
    input_output_count: usize,
    working_set: &mut HashSet<NodeId, RandomState>,
) -> Box<[NodeId]> {
    working_set.clear();
    for connection in connections {
        if connection.source.0 >= input_output_count {
            working_set.insert(connection.source);
        }
        if connection.target.0 >= input_output_count {
            working_set.insert(connection.target);
        }
    }

    let mut ids: Vec<NodeId> = working_set.drain().collect();
    ids.sort_unstable();
    ids.into_boxed_slice()
}

/// Returns whether `hidden` is a strictly ascending list of
/// valid hidden ids that matches the set referenced by `connections`.
pub(crate) fn validate_hidden_node_ids(
    hidden: &[NodeId],
    connections: &[DirectedConnection],
    input_output_count: usize,
) -> bool {
    let ascending = hidden.windows(2).all(|w| w[0] < w[1]);
    let above_fixed = hidden
        .first()
        .map_or(true, |id| id.0 >= input_output_count);
    if !ascending || !above_fixed {
        return false;
    }

    let mut working_set = HashSet::default();
    *hidden == *hidden_node_ids(connections, input_output_count, &mut working_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_functions() {
        assert_eq!(ActivationType::Gaussian.activate(0.0), 1.0);
        assert!(ActivationType::Sinusoidal.activate(1.0).abs() < 1e-6);
        assert!(ActivationType::Sigmoid.activate(10.0) > 0.99);
        assert_eq!(ActivationType::ReLU.activate(3.0), 3.0);
    }

    #[test]
    fn hidden_ids_ignore_fixed_nodes() {
        let connections = [
            DirectedConnection::new(0, 4),
            DirectedConnection::new(1, 3),
            DirectedConnection::new(2, 3),
        ];
        let mut working_set = HashSet::default();
        assert!(hidden_node_ids(&connections, 5, &mut working_set).is_empty());
        assert!(working_set.is_empty());
    }

    #[test]
    fn hidden_ids_are_deduplicated_and_sorted() {
        let connections = [
            DirectedConnection::new(0, 40),
            DirectedConnection::new(40, 9),
            DirectedConnection::new(9, 40),
            DirectedConnection::new(9, 1),
        ];
        let mut working_set = HashSet::default();
        let hidden = hidden_node_ids(&connections, 2, &mut working_set);
        assert_eq!(&hidden[..], &[NodeId(9), NodeId(40)]);
    }

    #[test]
    fn hidden_id_validation() {
        let connections = [DirectedConnection::new(0, 7), DirectedConnection::new(7, 2)];
        assert!(validate_hidden_node_ids(&[NodeId(7)], &connections, 3));
        assert!(!validate_hidden_node_ids(&[], &connections, 3));
        assert!(!validate_hidden_node_ids(&[NodeId(7), NodeId(8)], &connections, 3));
        assert!(!validate_hidden_node_ids(&[NodeId(2)], &connections, 3));
        assert!(validate_hidden_node_ids(&[], &[], 3));
    }

    #[test]
    fn node_id_serializes_transparently() {
        assert_eq!(serde_json::to_string(&NodeId(12)).unwrap(), "12");
    }
}
