//! # OxiNEAT-Graph
//! Compilation of NEAT genomes into dense, array-backed directed graphs.
//!
//! A genome is described by a set of connection genes, each joining two
//! nodes identified by sparse, historically-assigned [`NodeId`]s. Before a
//! genome can be evaluated, those genes are compiled into a [`DirectedGraph`]
//! over dense [`NodeIndex`]es, and, for feed-forward-only genomes, into an
//! [`AcyclicDirectedGraph`] whose nodes are ordered by depth so that a single
//! forward pass evaluates the whole network.
//!
//! Compilation happens once per genome, at birth. The resulting [`Genome`]
//! is immutable; offspring that only differ from their parent in connection
//! weights share the parent's compiled topology.
//!
//! [`NodeId`]: crate::genomics::NodeId
//! [`NodeIndex`]: crate::graphs::NodeIndex
//! [`DirectedGraph`]: crate::graphs::DirectedGraph
//! [`AcyclicDirectedGraph`]: crate::graphs::AcyclicDirectedGraph
//! [`Genome`]: crate::genomics::Genome
//!
//! # Example usage: compiling a feed-forward genome
//! ```
//! use oxineat_graph::genomics::{ConnectionGene, ConnectionGenes, GenomeBuilder, MetaGenome, NodeId};
//! use oxineat_graph::graphs::{NodeIdMap, NodeIndex};
//! use std::num::NonZeroUsize;
//! use std::sync::Arc;
//!
//! let meta = Arc::new(MetaGenome {
//!     input_count: NonZeroUsize::new(2).unwrap(),
//!     output_count: NonZeroUsize::new(1).unwrap(),
//!     is_acyclic: true,
//!     connection_weight_scale: 5.0,
//!     ..MetaGenome::zero()
//! });
//!
//! // Inputs 0 and 1 feed hidden node 7, which feeds output 2.
//! let genes: ConnectionGenes = vec![
//!     ConnectionGene::new(0, 0, 7, 0.5),
//!     ConnectionGene::new(1, 1, 7, -0.5),
//!     ConnectionGene::new(2, 7, 2, 1.0),
//! ]
//! .into_iter()
//! .collect();
//!
//! let mut builder = GenomeBuilder::new(meta);
//! let genome = builder.create(0, 0, genes).unwrap();
//!
//! // The hidden node sits between the inputs and the output.
//! let depth_info = genome.depth_info().unwrap();
//! assert_eq!(depth_info.network_depth(), 3);
//!
//! // Output 2 is renumbered after hidden node 7, which is shallower.
//! let map = genome.node_index_map();
//! assert_eq!(map.map(NodeId(7)), NodeIndex(2));
//! assert_eq!(map.map(NodeId(2)), NodeIndex(3));
//! ```

pub mod genomics;
pub mod graphs;

/// Identifier type used to designate historically
/// identical connection genes for the purposes of
/// genome alignment during crossover.
pub type Innovation = usize;
