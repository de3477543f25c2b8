//! Genomes are the unit of evolution in NEAT.
//! Here, a genome is a set of connection genes compiled
//! into the graph structures a network is evaluated from.
//! Compiled genomes are immutable: genetic operators produce
//! new gene sets, which are compiled into new genomes.

mod builder;
mod config;
mod errors;
mod genes;
mod nodes;
mod validation;

pub use builder::GenomeBuilder;
pub use config::MetaGenome;
pub use errors::ValidationError;
pub use genes::{ConnectionGene, ConnectionGenes, DirectedConnection};
pub use nodes::{hidden_node_ids, ActivationType, NodeId};
pub use validation::{validate, validate_depth_info};

use crate::graphs::{
    AcyclicDirectedGraph, CyclicConnectionCheck, DepthInfo, DirectedGraph, NodeIdMap,
    NodeIndexMap,
};
use crate::Innovation;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// The graph a genome's genes were compiled into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompiledGraph {
    /// Graph of a genome allowed to contain cycles.
    /// Connections are in gene order.
    Cyclic(DirectedGraph),
    /// Depth-ordered graph of a feed-forward genome.
    Acyclic {
        graph: AcyclicDirectedGraph,
        /// Depths by node index before depth ordering.
        depth_info: DepthInfo,
    },
}

/// Everything compiled from a genome's connections,
/// independently of connection weights.
///
/// Topologies are shared, through an [`Arc`], by all genomes
/// with the same connection genes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenomeTopology {
    hidden_node_ids: Box<[NodeId]>,
    node_index_map: NodeIndexMap,
    graph: CompiledGraph,
    gene_index_by_innovation: Box<[usize]>,
}

impl GenomeTopology {
    pub(crate) fn new(
        hidden_node_ids: Box<[NodeId]>,
        node_index_map: NodeIndexMap,
        graph: CompiledGraph,
        innovations: &[Innovation],
    ) -> GenomeTopology {
        let mut gene_index_by_innovation: Vec<usize> = (0..innovations.len()).collect();
        gene_index_by_innovation.sort_unstable_by_key(|i| innovations[*i]);
        GenomeTopology {
            hidden_node_ids,
            node_index_map,
            graph,
            gene_index_by_innovation: gene_index_by_innovation.into_boxed_slice(),
        }
    }

    /// Returns the ids of all hidden nodes, in ascending order.
    pub fn hidden_node_ids(&self) -> &[NodeId] {
        &self.hidden_node_ids
    }

    pub fn node_index_map(&self) -> &NodeIndexMap {
        &self.node_index_map
    }

    pub fn graph(&self) -> &CompiledGraph {
        &self.graph
    }

    /// Returns the directed graph, whether or not it is depth ordered.
    pub fn directed_graph(&self) -> &DirectedGraph {
        match &self.graph {
            CompiledGraph::Cyclic(graph) => graph,
            CompiledGraph::Acyclic { graph, .. } => graph.graph(),
        }
    }

    /// Returns the depth-ordered graph of an acyclic genome.
    pub fn acyclic_graph(&self) -> Option<&AcyclicDirectedGraph> {
        match &self.graph {
            CompiledGraph::Cyclic(_) => None,
            CompiledGraph::Acyclic { graph, .. } => Some(graph),
        }
    }

    /// Returns the depth info of an acyclic genome.
    pub fn depth_info(&self) -> Option<&DepthInfo> {
        match &self.graph {
            CompiledGraph::Cyclic(_) => None,
            CompiledGraph::Acyclic { depth_info, .. } => Some(depth_info),
        }
    }

    /// Returns gene positions sorted by innovation id.
    pub fn gene_index_by_innovation(&self) -> &[usize] {
        &self.gene_index_by_innovation
    }
}

/// A compiled genome.
///
/// Construct genomes with a [`GenomeBuilder`], or derive
/// weight-only offspring with [`with_weights`].
///
/// [`with_weights`]: Genome::with_weights
#[derive(Clone, Debug, PartialEq)]
pub struct Genome {
    meta: Arc<MetaGenome>,
    id: usize,
    birth_generation: usize,
    genes: ConnectionGenes,
    topology: Arc<GenomeTopology>,
}

impl Genome {
    pub(crate) fn new(
        meta: Arc<MetaGenome>,
        id: usize,
        birth_generation: usize,
        genes: ConnectionGenes,
        topology: Arc<GenomeTopology>,
    ) -> Genome {
        Genome {
            meta,
            id,
            birth_generation,
            genes,
            topology,
        }
    }

    pub fn meta(&self) -> &Arc<MetaGenome> {
        &self.meta
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the generation in which the genome was created.
    pub fn birth_generation(&self) -> usize {
        self.birth_generation
    }

    /// Returns the genome's connection genes, in (source, target) order.
    pub fn genes(&self) -> &ConnectionGenes {
        &self.genes
    }

    /// Returns the genome's compiled topology, for sharing
    /// with genomes that have identical connections.
    pub fn topology(&self) -> &Arc<GenomeTopology> {
        &self.topology
    }

    pub fn hidden_node_ids(&self) -> &[NodeId] {
        self.topology.hidden_node_ids()
    }

    pub fn node_index_map(&self) -> &NodeIndexMap {
        self.topology.node_index_map()
    }

    pub fn directed_graph(&self) -> &DirectedGraph {
        self.topology.directed_graph()
    }

    pub fn acyclic_graph(&self) -> Option<&AcyclicDirectedGraph> {
        self.topology.acyclic_graph()
    }

    pub fn depth_info(&self) -> Option<&DepthInfo> {
        self.topology.depth_info()
    }

    /// Returns, for an acyclic genome, the gene position
    /// of each connection of its depth-ordered graph.
    pub fn connection_index_map(&self) -> Option<&[usize]> {
        self.acyclic_graph()
            .map(AcyclicDirectedGraph::connection_index_map)
    }

    /// Returns the number of connections of the genome.
    pub fn complexity(&self) -> usize {
        self.genes.len()
    }

    /// Returns whether `id` is a hidden node of the genome.
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::{ConnectionGene, GenomeBuilder, MetaGenome, NodeId};
    /// use std::sync::Arc;
    ///
    /// let genes = vec![ConnectionGene::new(0, 0, 5, 1.0), ConnectionGene::new(1, 5, 1, 1.0)];
    /// let mut builder = GenomeBuilder::new(Arc::new(MetaGenome::zero()));
    /// let genome = builder.create(0, 0, genes.into_iter().collect()).unwrap();
    ///
    /// assert!(genome.contains_hidden_node(NodeId(5)));
    /// assert!(!genome.contains_hidden_node(NodeId(1)));
    /// ```
    pub fn contains_hidden_node(&self, id: NodeId) -> bool {
        self.hidden_node_ids().binary_search(&id).is_ok()
    }

    /// Returns the connection weights in graph connection order.
    ///
    /// Weights are borrowed as they are for genomes whose graph
    /// keeps gene order, and gathered through the connection
    /// index map for depth-ordered graphs.
    pub fn digraph_weights(&self) -> Cow<'_, [f32]> {
        let weights = self.genes.weights();
        match self.connection_index_map() {
            None => Cow::Borrowed(weights),
            Some(map) => Cow::Owned(map.iter().map(|i| weights[*i]).collect()),
        }
    }

    /// Returns the position of the gene with the specified innovation id.
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::{ConnectionGene, GenomeBuilder, MetaGenome};
    /// use std::sync::Arc;
    ///
    /// let genes = vec![ConnectionGene::new(8, 0, 1, 1.0), ConnectionGene::new(3, 1, 1, 1.0)];
    /// let mut builder = GenomeBuilder::new(Arc::new(MetaGenome::zero()));
    /// let genome = builder.create(0, 0, genes.into_iter().collect()).unwrap();
    ///
    /// assert_eq!(genome.gene_index_by_innovation(3), Some(1));
    /// assert_eq!(genome.gene_index_by_innovation(4), None);
    /// ```
    pub fn gene_index_by_innovation(&self, innovation: Innovation) -> Option<usize> {
        let order = self.topology.gene_index_by_innovation();
        let innovations = self.genes.innovations();
        order
            .binary_search_by_key(&innovation, |i| innovations[*i])
            .ok()
            .map(|position| order[position])
    }

    /// Returns whether adding a connection from `source` to `target`
    /// would form a cycle in the genome's graph.
    ///
    /// # Panics
    /// This function panics if either id is not a node of the genome.
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::{ConnectionGene, GenomeBuilder, MetaGenome, NodeId};
    /// use oxineat_graph::graphs::CyclicConnectionCheck;
    /// use std::sync::Arc;
    ///
    /// let meta = MetaGenome {
    ///     is_acyclic: true,
    ///     ..MetaGenome::zero()
    /// };
    /// let genes = vec![ConnectionGene::new(0, 0, 5, 1.0), ConnectionGene::new(1, 5, 1, 1.0)];
    /// let mut builder = GenomeBuilder::new(Arc::new(meta));
    /// let genome = builder.create(0, 0, genes.into_iter().collect()).unwrap();
    ///
    /// let mut check = CyclicConnectionCheck::new();
    /// assert!(genome.is_connection_cyclic(NodeId(1), NodeId(5), &mut check));
    /// assert!(!genome.is_connection_cyclic(NodeId(0), NodeId(1), &mut check));
    /// ```
    pub fn is_connection_cyclic(
        &self,
        source: NodeId,
        target: NodeId,
        check: &mut CyclicConnectionCheck,
    ) -> bool {
        let map = self.node_index_map();
        check.is_connection_cyclic(self.directed_graph(), map.map(source), map.map(target))
    }

    /// Returns an offspring with the same connections and the
    /// specified weights, sharing this genome's topology.
    ///
    /// # Panics
    /// This function panics if `weights` does not hold one
    /// weight per gene.
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::{ConnectionGene, GenomeBuilder, MetaGenome};
    /// use std::sync::Arc;
    ///
    /// let genes = vec![ConnectionGene::new(0, 0, 1, 1.0)];
    /// let mut builder = GenomeBuilder::new(Arc::new(MetaGenome::zero()));
    /// let parent = builder.create(0, 0, genes.into_iter().collect()).unwrap();
    ///
    /// let child = parent.with_weights(1, 1, vec![-0.5]);
    /// assert_eq!(child.genes().weights(), &[-0.5]);
    /// assert!(Arc::ptr_eq(parent.topology(), child.topology()));
    /// ```
    pub fn with_weights(&self, id: usize, birth_generation: usize, weights: Vec<f32>) -> Genome {
        let genes = ConnectionGenes::from_parts(
            self.genes.connections().to_vec(),
            weights,
            self.genes.innovations().to_vec(),
        );
        Genome::new(
            Arc::clone(&self.meta),
            id,
            birth_generation,
            genes,
            Arc::clone(&self.topology),
        )
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Genome")
            .field("Id", &self.id)
            .field("Generation", &self.birth_generation)
            .field("Genes", &format_args!("{}", self.genes))
            .field("Hidden", &self.hidden_node_ids())
            .finish()
    }
}
