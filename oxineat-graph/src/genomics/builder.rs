use crate::genomics::{
    hidden_node_ids, CompiledGraph, ConnectionGenes, Genome, GenomeTopology, MetaGenome, NodeId,
};
use crate::graphs::{AcyclicGraphBuilder, DirectedGraph, GraphError, NodeIndexMap};

use ahash::RandomState;
use tracing::trace;

use std::collections::HashSet;
use std::sync::Arc;

/// Compiles connection genes into [`Genome`]s.
///
/// A builder is bound to the metadata of one population,
/// which selects the compilation pipeline: genomes flagged
/// as acyclic get a depth-ordered graph, others a graph in
/// gene order.
///
/// Builders keep working memory between builds. Use one
/// builder per thread.
///
/// # Examples
/// ```
/// use oxineat_graph::genomics::{ConnectionGene, GenomeBuilder, MetaGenome, NodeId};
/// use oxineat_graph::graphs::{NodeIdMap, NodeIndex};
/// use std::num::NonZeroUsize;
/// use std::sync::Arc;
///
/// let meta = MetaGenome {
///     input_count: NonZeroUsize::new(3).unwrap(),
///     output_count: NonZeroUsize::new(2).unwrap(),
///     ..MetaGenome::zero()
/// };
/// let genes = vec![
///     ConnectionGene::new(0, 0, 7, 1.0),
///     ConnectionGene::new(1, 7, 9, 1.0),
///     ConnectionGene::new(2, 9, 12, 1.0),
///     ConnectionGene::new(3, 12, 4, 1.0),
/// ];
///
/// let mut builder = GenomeBuilder::new(Arc::new(meta));
/// let genome = builder.create(0, 0, genes.into_iter().collect()).unwrap();
///
/// let map = genome.node_index_map();
/// assert_eq!(map.map(NodeId(2)), NodeIndex(2));
/// assert_eq!(map.map(NodeId(7)), NodeIndex(5));
/// assert_eq!(map.map(NodeId(9)), NodeIndex(6));
/// assert_eq!(map.map(NodeId(12)), NodeIndex(7));
/// ```
#[derive(Debug)]
pub struct GenomeBuilder {
    meta: Arc<MetaGenome>,
    working_id_set: HashSet<NodeId, RandomState>,
    acyclic_builder: AcyclicGraphBuilder,
}

impl GenomeBuilder {
    pub fn new(meta: Arc<MetaGenome>) -> GenomeBuilder {
        GenomeBuilder {
            meta,
            working_id_set: HashSet::default(),
            acyclic_builder: AcyclicGraphBuilder::new(),
        }
    }

    pub fn meta(&self) -> &Arc<MetaGenome> {
        &self.meta
    }

    /// Compiles `genes` into a new genome. The genes are
    /// sorted first, if they are not sorted already.
    ///
    /// # Errors
    /// For acyclic genomes, returns [`GraphError::CyclicGraph`] if
    /// the genes contain a cycle and [`GraphError::InputNodeDepth`]
    /// if an input node has incoming connections.
    pub fn create(
        &mut self,
        id: usize,
        birth_generation: usize,
        mut genes: ConnectionGenes,
    ) -> Result<Genome, GraphError> {
        if !genes.is_sorted() {
            genes.sort();
        }
        let hidden_node_ids = hidden_node_ids(
            genes.connections(),
            self.meta.input_output_count(),
            &mut self.working_id_set,
        );
        self.compile(id, birth_generation, genes, hidden_node_ids)
    }

    /// Compiles `genes` into a new genome, given the ascending
    /// list of its hidden node ids. The genes are sorted first,
    /// if they are not sorted already.
    ///
    /// # Errors
    /// See [`create`].
    ///
    /// [`create`]: GenomeBuilder::create
    pub fn create_with_hidden_nodes(
        &mut self,
        id: usize,
        birth_generation: usize,
        mut genes: ConnectionGenes,
        hidden_node_ids: Box<[NodeId]>,
    ) -> Result<Genome, GraphError> {
        if !genes.is_sorted() {
            genes.sort();
        }
        debug_assert!(
            super::nodes::validate_hidden_node_ids(
                &hidden_node_ids,
                genes.connections(),
                self.meta.input_output_count()
            ),
            "hidden node ids do not match the connection genes"
        );
        self.compile(id, birth_generation, genes, hidden_node_ids)
    }

    /// Assembles a genome out of `genes` and a topology
    /// compiled from identical connections, typically those
    /// of a parent differing only in connection weights.
    /// Nothing is recompiled.
    ///
    /// `genes` must be in the same order as the genes the
    /// topology was compiled from.
    ///
    /// # Examples
    /// ```
    /// use oxineat_graph::genomics::{ConnectionGene, GenomeBuilder, MetaGenome};
    /// use std::sync::Arc;
    ///
    /// let mut builder = GenomeBuilder::new(Arc::new(MetaGenome::zero()));
    /// let parent_genes = vec![ConnectionGene::new(0, 0, 1, 1.0)];
    /// let parent = builder.create(0, 0, parent_genes.into_iter().collect()).unwrap();
    ///
    /// let mut genes = parent.genes().clone();
    /// genes.weights_mut()[0] = 2.0;
    /// let child = builder.create_with_topology(1, 1, genes, Arc::clone(parent.topology()));
    ///
    /// assert!(Arc::ptr_eq(parent.topology(), child.topology()));
    /// ```
    pub fn create_with_topology(
        &self,
        id: usize,
        birth_generation: usize,
        genes: ConnectionGenes,
        topology: Arc<GenomeTopology>,
    ) -> Genome {
        debug_assert_eq!(
            genes.len(),
            topology.directed_graph().connection_count(),
            "connection genes do not match the shared topology"
        );
        Genome::new(
            Arc::clone(&self.meta),
            id,
            birth_generation,
            genes,
            topology,
        )
    }

    fn compile(
        &mut self,
        id: usize,
        birth_generation: usize,
        genes: ConnectionGenes,
        hidden_node_ids: Box<[NodeId]>,
    ) -> Result<Genome, GraphError> {
        let topology = if self.meta.is_acyclic {
            self.compile_acyclic(&genes, hidden_node_ids)?
        } else {
            self.compile_cyclic(&genes, hidden_node_ids)
        };

        trace!(
            id,
            acyclic = self.meta.is_acyclic,
            nodes = topology.directed_graph().total_node_count(),
            connections = genes.len(),
            "compiled genome"
        );
        Ok(Genome::new(
            Arc::clone(&self.meta),
            id,
            birth_generation,
            genes,
            Arc::new(topology),
        ))
    }

    fn compile_cyclic(
        &self,
        genes: &ConnectionGenes,
        hidden_node_ids: Box<[NodeId]>,
    ) -> GenomeTopology {
        let node_index_map =
            NodeIndexMap::compile(self.meta.input_output_count(), &hidden_node_ids);
        let graph = DirectedGraph::from_connections(
            self.meta.input_count.get(),
            self.meta.output_count.get(),
            genes.connections(),
            &node_index_map,
        );
        GenomeTopology::new(
            hidden_node_ids,
            node_index_map,
            CompiledGraph::Cyclic(graph),
            genes.innovations(),
        )
    }

    fn compile_acyclic(
        &mut self,
        genes: &ConnectionGenes,
        hidden_node_ids: Box<[NodeId]>,
    ) -> Result<GenomeTopology, GraphError> {
        let input_count = self.meta.input_count.get();
        let output_count = self.meta.output_count.get();

        let gene_order_map =
            NodeIndexMap::compile(self.meta.input_output_count(), &hidden_node_ids);
        let graph = DirectedGraph::from_connections(
            input_count,
            output_count,
            genes.connections(),
            &gene_order_map,
        );
        let ordered = self.acyclic_builder.build(graph)?;

        let node_index_map = NodeIndexMap::compile_depth_ordered(
            input_count,
            output_count,
            &hidden_node_ids,
            &ordered.new_index_by_old,
        );
        Ok(GenomeTopology::new(
            hidden_node_ids,
            node_index_map,
            CompiledGraph::Acyclic {
                graph: ordered.graph,
                depth_info: ordered.depth_info,
            },
            genes.innovations(),
        ))
    }
}
