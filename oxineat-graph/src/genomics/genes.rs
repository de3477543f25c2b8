use crate::genomics::{NodeId, ValidationError};
use crate::graphs::sort::{self, GeneSlices};
use crate::Innovation;

use serde::{Deserialize, Serialize};

use std::fmt;

/// A directed connection between two genome-space nodes.
///
/// Connections are ordered by source id, then by target id.
/// This is the canonical order of a genome's genes.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DirectedConnection {
    pub source: NodeId,
    pub target: NodeId,
}

impl DirectedConnection {
    /// Returns a new connection between the specified node ids.
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::{DirectedConnection, NodeId};
    ///
    /// let connection = DirectedConnection::new(3, 9);
    /// assert_eq!(connection.source, NodeId(3));
    /// assert!(connection < DirectedConnection::new(3, 10));
    /// assert!(connection < DirectedConnection::new(4, 0));
    /// ```
    pub fn new(source: usize, target: usize) -> DirectedConnection {
        DirectedConnection {
            source: NodeId(source),
            target: NodeId(target),
        }
    }
}

impl fmt::Display for DirectedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// A single connection gene, as stored at one position
/// of a [`ConnectionGenes`] store.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub innovation: Innovation,
    pub connection: DirectedConnection,
    pub weight: f32,
}

impl ConnectionGene {
    /// Returns a new gene with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::ConnectionGene;
    ///
    /// let gene = ConnectionGene::new(42, 3, 9, 2.0);
    /// assert_eq!(gene.to_string(), "42[3->9, 2.000]");
    /// ```
    pub fn new(
        innovation: Innovation,
        source: usize,
        target: usize,
        weight: f32,
    ) -> ConnectionGene {
        ConnectionGene {
            innovation,
            connection: DirectedConnection::new(source, target),
            weight,
        }
    }
}

impl fmt::Display for ConnectionGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}->{}, {:.3}]",
            self.innovation, self.connection.source, self.connection.target, self.weight
        )
    }
}

/// The connection genes of a genome, stored as three
/// parallel arrays of equal length: connections, weights
/// and innovation ids.
///
/// A genome's genes are kept in ascending connection order
/// (see [`DirectedConnection`]), with no duplicate connections.
/// That order is established with [`sort`] and is what allows
/// the compiled graph to be laid out without a lookup table.
///
/// [`sort`]: ConnectionGenes::sort
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConnectionGenes")]
pub struct ConnectionGenes {
    connections: Vec<DirectedConnection>,
    weights: Vec<f32>,
    innovations: Vec<Innovation>,
}

impl ConnectionGenes {
    /// Returns a store of `len` zeroed genes, to be filled in with [`set`].
    ///
    /// [`set`]: ConnectionGenes::set
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::{ConnectionGene, ConnectionGenes};
    ///
    /// let mut genes = ConnectionGenes::new(2);
    /// genes.set(0, ConnectionGene::new(5, 0, 2, 1.0));
    /// genes.set(1, ConnectionGene::new(3, 1, 2, -1.0));
    ///
    /// assert_eq!(genes.len(), 2);
    /// assert_eq!(genes.get(1).innovation, 3);
    /// ```
    pub fn new(len: usize) -> ConnectionGenes {
        ConnectionGenes {
            connections: vec![DirectedConnection::default(); len],
            weights: vec![0.0; len],
            innovations: vec![0; len],
        }
    }

    /// Assembles a store out of pre-existing arrays.
    ///
    /// # Panics
    /// This function panics if the arrays' lengths differ.
    pub fn from_parts(
        connections: Vec<DirectedConnection>,
        weights: Vec<f32>,
        innovations: Vec<Innovation>,
    ) -> ConnectionGenes {
        Self::try_from_parts(connections, weights, innovations)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    fn try_from_parts(
        connections: Vec<DirectedConnection>,
        weights: Vec<f32>,
        innovations: Vec<Innovation>,
    ) -> Result<ConnectionGenes, ValidationError> {
        if connections.len() != weights.len() || connections.len() != innovations.len() {
            return Err(ValidationError::GeneArrayLengthMismatch {
                connections: connections.len(),
                weights: weights.len(),
                innovations: innovations.len(),
            });
        }
        Ok(ConnectionGenes {
            connections,
            weights,
            innovations,
        })
    }

    /// Returns the number of genes in the store.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` if the store holds no genes.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Returns the gene at position `index`.
    ///
    /// # Panics
    /// This function panics if `index` is out of bounds.
    pub fn get(&self, index: usize) -> ConnectionGene {
        ConnectionGene {
            innovation: self.innovations[index],
            connection: self.connections[index],
            weight: self.weights[index],
        }
    }

    /// Overwrites the gene at position `index`.
    ///
    /// # Panics
    /// This function panics if `index` is out of bounds.
    pub fn set(&mut self, index: usize, gene: ConnectionGene) {
        self.connections[index] = gene.connection;
        self.weights[index] = gene.weight;
        self.innovations[index] = gene.innovation;
    }

    /// Returns an iterator over the genes in storage order.
    pub fn iter(&self) -> impl Iterator<Item = ConnectionGene> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Returns the connection array.
    pub fn connections(&self) -> &[DirectedConnection] {
        &self.connections
    }

    /// Returns the weight array.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Returns the weight array, mutably. Weights are the
    /// only part of the store that may change without
    /// invalidating a compiled topology.
    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    /// Returns the innovation id array.
    pub fn innovations(&self) -> &[Innovation] {
        &self.innovations
    }

    /// Sorts all three arrays together, in place, by connection.
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::{ConnectionGene, ConnectionGenes, DirectedConnection};
    ///
    /// let mut genes: ConnectionGenes = vec![
    ///     ConnectionGene::new(0, 1, 2, 0.1),
    ///     ConnectionGene::new(1, 0, 3, 0.2),
    ///     ConnectionGene::new(2, 0, 2, 0.3),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// genes.sort();
    ///
    /// assert!(genes.is_sorted());
    /// assert_eq!(genes.connections()[0], DirectedConnection::new(0, 2));
    /// assert_eq!(genes.weights(), &[0.3, 0.2, 0.1]);
    /// assert_eq!(genes.innovations(), &[2, 1, 0]);
    /// ```
    pub fn sort(&mut self) {
        sort::sort(&mut GeneSlices {
            connections: &mut self.connections,
            weights: &mut self.weights,
            innovations: &mut self.innovations,
        });
    }

    /// Returns `true` if the connections are in strictly ascending order.
    pub fn is_sorted(&self) -> bool {
        self.connections.windows(2).all(|w| w[0] < w[1])
    }
}

impl FromIterator<ConnectionGene> for ConnectionGenes {
    fn from_iter<I: IntoIterator<Item = ConnectionGene>>(iter: I) -> ConnectionGenes {
        let mut genes = ConnectionGenes::default();
        for gene in iter {
            genes.connections.push(gene.connection);
            genes.weights.push(gene.weight);
            genes.innovations.push(gene.innovation);
        }
        genes
    }
}

impl fmt::Display for ConnectionGenes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, gene) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", gene)?;
        }
        write!(f, "]")
    }
}

/// Unchecked serialized form of [`ConnectionGenes`].
#[derive(Deserialize)]
struct RawConnectionGenes {
    connections: Vec<DirectedConnection>,
    weights: Vec<f32>,
    innovations: Vec<Innovation>,
}

impl TryFrom<RawConnectionGenes> for ConnectionGenes {
    type Error = ValidationError;

    fn try_from(raw: RawConnectionGenes) -> Result<ConnectionGenes, ValidationError> {
        ConnectionGenes::try_from_parts(raw.connections, raw.weights, raw.innovations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::prelude::*;

    fn shuffled_genes(len: usize, seed: u64) -> ConnectionGenes {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut genes: Vec<ConnectionGene> = (0..len)
            .map(|i| ConnectionGene::new(i, i / 7, i % 7 + 100, i as f32))
            .collect();
        genes.shuffle(&mut rng);
        genes.into_iter().collect()
    }

    #[test]
    fn sort_keeps_arrays_aligned() {
        for len in [0, 1, 2, 23, 24, 25, 100, 1000] {
            let mut genes = shuffled_genes(len, len as u64);
            genes.sort();
            assert!(genes.is_sorted());
            for gene in genes.iter() {
                let i = gene.innovation;
                assert_eq!(gene.connection, DirectedConnection::new(i / 7, i % 7 + 100));
                assert_eq!(gene.weight, i as f32);
            }
        }
    }

    #[test]
    fn duplicate_connections_are_not_sorted() {
        let genes: ConnectionGenes = vec![
            ConnectionGene::new(0, 0, 2, 0.0),
            ConnectionGene::new(1, 0, 2, 1.0),
        ]
        .into_iter()
        .collect();
        assert!(!genes.is_sorted());
    }

    #[test]
    fn weights_mut_leaves_connections() {
        let mut genes = shuffled_genes(10, 3);
        let connections = genes.connections().to_vec();
        genes.weights_mut().iter_mut().for_each(|w| *w = 0.5);
        assert_eq!(genes.connections(), &connections[..]);
        assert!(genes.weights().iter().all(|w| *w == 0.5));
    }

    #[test]
    fn display() {
        let genes: ConnectionGenes = vec![
            ConnectionGene::new(0, 0, 2, 0.5),
            ConnectionGene::new(4, 1, 2, -1.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(genes.to_string(), "[0[0->2, 0.500], 4[1->2, -1.000]]");
    }

    #[test]
    #[should_panic]
    fn from_parts_rejects_mismatched_lengths() {
        ConnectionGenes::from_parts(vec![DirectedConnection::new(0, 1)], vec![], vec![0]);
    }

    #[test]
    fn deserialization_checks_lengths() {
        let genes = shuffled_genes(5, 9);
        let json = serde_json::to_string(&genes).unwrap();
        assert_eq!(serde_json::from_str::<ConnectionGenes>(&json).unwrap(), genes);

        let bad = r#"{
            "connections": [{"source": 0, "target": 1}],
            "weights": [1.0, 2.0],
            "innovations": [0]
        }"#;
        assert!(serde_json::from_str::<ConnectionGenes>(bad).is_err());
    }
}
