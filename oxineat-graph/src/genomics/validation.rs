use crate::genomics::nodes::validate_hidden_node_ids;
use crate::genomics::{CompiledGraph, Genome, NodeId, ValidationError};
use crate::graphs::{
    AcyclicDirectedGraph, CyclicGraphCheck, DepthInfo, DirectedGraph, NodeIdMap, NodeIndex,
};

/// Cross-checks every structure of a compiled genome
/// against the others and against the genome's metadata.
///
/// Validation is never part of genome construction: it is
/// meant for tests, and for checking genomes assembled or
/// deserialized by other means.
///
/// # Errors
/// Returns the first inconsistency found.
///
/// # Examples
/// ```
/// use oxineat_graph::genomics::{validate, ConnectionGene, GenomeBuilder, MetaGenome};
/// use std::sync::Arc;
///
/// let meta = MetaGenome {
///     is_acyclic: true,
///     ..MetaGenome::zero()
/// };
/// let genes = vec![ConnectionGene::new(0, 0, 3, 1.0), ConnectionGene::new(1, 3, 1, 1.0)];
/// let mut builder = GenomeBuilder::new(Arc::new(meta));
/// let genome = builder.create(0, 0, genes.into_iter().collect()).unwrap();
///
/// assert!(validate(&genome).is_ok());
/// ```
pub fn validate(genome: &Genome) -> Result<(), ValidationError> {
    let meta = genome.meta();
    let genes = genome.genes();
    let connections = genes.connections();

    if genes.weights().len() != connections.len() || genes.innovations().len() != connections.len()
    {
        return Err(ValidationError::GeneArrayLengthMismatch {
            connections: connections.len(),
            weights: genes.weights().len(),
            innovations: genes.innovations().len(),
        });
    }
    if let Some(index) = connections.windows(2).position(|w| w[0] >= w[1]) {
        return Err(ValidationError::UnsortedGenes { index: index + 1 });
    }
    if !validate_hidden_node_ids(
        genome.hidden_node_ids(),
        connections,
        meta.input_output_count(),
    ) {
        return Err(ValidationError::InvalidHiddenNodeIds);
    }

    let graph = genome.directed_graph();
    let map = genome.node_index_map();
    if graph.input_count() != meta.input_count.get()
        || graph.output_count() != meta.output_count.get()
    {
        return Err(ValidationError::InputOutputCountMismatch {
            expected_inputs: meta.input_count.get(),
            expected_outputs: meta.output_count.get(),
            inputs: graph.input_count(),
            outputs: graph.output_count(),
        });
    }
    let expected_nodes = meta.input_output_count() + genome.hidden_node_ids().len();
    if graph.total_node_count() != expected_nodes || map.count() != expected_nodes {
        return Err(ValidationError::NodeCountMismatch {
            expected: expected_nodes,
            graph: graph.total_node_count(),
            map: map.count(),
        });
    }
    if graph.connection_count() != connections.len() {
        return Err(ValidationError::ConnectionCountMismatch {
            genes: connections.len(),
            graph: graph.connection_count(),
        });
    }
    validate_graph_order(graph)?;
    validate_innovation_index(genome)?;

    match (meta.is_acyclic, genome.topology().graph()) {
        (false, CompiledGraph::Cyclic(_)) => {
            validate_connection_mapping(genome, |i| i)?;
        }
        (true, CompiledGraph::Acyclic { graph, depth_info }) => {
            let connection_index_map = graph.connection_index_map();
            validate_connection_index_map(connection_index_map)?;
            validate_connection_mapping(genome, |i| connection_index_map[i])?;
            validate_depth_info(depth_info, graph.graph().input_count())?;
            validate_depth_order(genome, graph, depth_info)?;
        }
        (is_acyclic, _) => return Err(ValidationError::GraphKindMismatch { is_acyclic }),
    }
    Ok(())
}

/// Checks that every input node of an acyclic graph is at depth 0.
///
/// # Errors
/// Returns [`ValidationError::InputNodeDepth`] for the first
/// input node found at a nonzero depth, and
/// [`ValidationError::MissingInputDepths`] if `depth_info`
/// holds fewer than `input_count` nodes.
///
/// # Examples
/// ```
/// use oxineat_graph::genomics::validate_depth_info;
/// use oxineat_graph::graphs::{AcyclicGraphDepthAnalysis, DirectedGraph, NodeIndex};
///
/// // Input 1 is fed by input 0.
/// let graph = DirectedGraph::new(
///     2, 1, 3,
///     vec![NodeIndex(0), NodeIndex(1)],
///     vec![NodeIndex(1), NodeIndex(2)],
/// );
/// let depth_info = AcyclicGraphDepthAnalysis::new()
///     .calculate_node_depths(&graph)
///     .unwrap();
///
/// assert!(validate_depth_info(&depth_info, 1).is_ok());
/// assert!(validate_depth_info(&depth_info, 2).is_err());
/// ```
pub fn validate_depth_info(
    depth_info: &DepthInfo,
    input_count: usize,
) -> Result<(), ValidationError> {
    let node_depths = depth_info.node_depths();
    let input_depths = node_depths.get(..input_count).ok_or(
        ValidationError::MissingInputDepths {
            inputs: input_count,
            nodes: node_depths.len(),
        },
    )?;
    match input_depths.iter().position(|depth| *depth != 0) {
        Some(input) => Err(ValidationError::InputNodeDepth {
            node: NodeIndex(input),
            depth: node_depths[input],
        }),
        None => Ok(()),
    }
}

fn validate_graph_order(graph: &DirectedGraph) -> Result<(), ValidationError> {
    let sources = graph.source_indexes();
    let targets = graph.target_indexes();
    for i in 1..sources.len() {
        if (sources[i - 1], targets[i - 1]) >= (sources[i], targets[i]) {
            return Err(ValidationError::UnsortedGraph { index: i });
        }
    }
    Ok(())
}

fn validate_innovation_index(genome: &Genome) -> Result<(), ValidationError> {
    let order = genome.topology().gene_index_by_innovation();
    let innovations = genome.genes().innovations();
    if !is_permutation(order, innovations.len())
        || order
            .windows(2)
            .any(|w| innovations[w[0]] >= innovations[w[1]])
    {
        return Err(ValidationError::InnovationIndexMismatch);
    }
    Ok(())
}

fn validate_connection_index_map(connection_index_map: &[usize]) -> Result<(), ValidationError> {
    if !is_permutation(connection_index_map, connection_index_map.len()) {
        return Err(ValidationError::InvalidConnectionIndexMap);
    }
    Ok(())
}

// Checks that graph connection i joins the mapped endpoints of gene `gene_of(i)`.
fn validate_connection_mapping(
    genome: &Genome,
    gene_of: impl Fn(usize) -> usize,
) -> Result<(), ValidationError> {
    let connections = genome.genes().connections();
    let graph = genome.directed_graph();
    let map = genome.node_index_map();
    let sources = graph.source_indexes();
    let targets = graph.target_indexes();

    for i in 0..sources.len() {
        let gene = gene_of(i);
        let connection = &connections[gene];
        if map.try_map(connection.source) != Some(sources[i])
            || map.try_map(connection.target) != Some(targets[i])
        {
            return Err(ValidationError::ConnectionMismatch { connection: gene });
        }
    }
    Ok(())
}

fn validate_depth_order(
    genome: &Genome,
    graph: &AcyclicDirectedGraph,
    depth_info: &DepthInfo,
) -> Result<(), ValidationError> {
    let meta = genome.meta();
    let map = genome.node_index_map();
    let node_depths = graph.node_depths();
    let node_count = graph.graph().total_node_count();

    if node_depths.len() != node_count || depth_info.node_depths().len() != node_count {
        return Err(ValidationError::NodeCountMismatch {
            expected: node_count,
            graph: node_depths.len(),
            map: depth_info.node_depths().len(),
        });
    }

    // Depth info keeps the node order from before depth ordering:
    // fixed nodes by id, then hidden nodes by id.
    let fixed_ids = (0..meta.input_output_count()).map(NodeId);
    let hidden_ids = genome.hidden_node_ids().iter().copied();
    for (old_index, id) in fixed_ids.chain(hidden_ids).enumerate() {
        let new_index = map.map(id);
        if depth_info.node_depths()[old_index] != node_depths[new_index.0] {
            return Err(ValidationError::NodeDepthMismatch { node: id });
        }
        if old_index < meta.input_count.get() && new_index.0 != old_index {
            return Err(ValidationError::NodeDepthMismatch { node: id });
        }
    }

    if let Some(node) = node_depths.windows(2).position(|w| w[0] > w[1]) {
        return Err(ValidationError::NodeOrderMismatch {
            node: NodeIndex(node + 1),
        });
    }

    let outputs = meta.input_count.get()..meta.input_output_count();
    if graph.output_node_indexes().len() != meta.output_count.get() {
        return Err(ValidationError::OutputIndexMismatch {
            output: NodeId(outputs.start),
        });
    }
    for (id, index) in outputs.map(NodeId).zip(graph.output_node_indexes()) {
        if map.map(id) != *index {
            return Err(ValidationError::OutputIndexMismatch { output: id });
        }
    }

    let sources = graph.graph().source_indexes();
    let targets = graph.graph().target_indexes();
    for (connection, (source, target)) in sources.iter().zip(targets).enumerate() {
        let source_depth = node_depths[source.0];
        let target_depth = node_depths[target.0];
        if source_depth >= target_depth {
            return Err(ValidationError::NonIncreasingDepth {
                connection,
                source_depth,
                target_depth,
            });
        }
    }

    validate_layers(graph, depth_info.network_depth())?;

    if CyclicGraphCheck::new().is_cyclic(graph.graph()) {
        return Err(ValidationError::CyclicGraph);
    }
    Ok(())
}

fn validate_layers(
    graph: &AcyclicDirectedGraph,
    network_depth: usize,
) -> Result<(), ValidationError> {
    let layers = graph.layers();
    let node_depths = graph.node_depths();
    let sources = graph.graph().source_indexes();
    if layers.len() != network_depth {
        return Err(ValidationError::LayerMismatch {
            layer: layers.len().min(network_depth),
        });
    }

    let mut start_node = 0;
    let mut start_connection = 0;
    for (depth, layer) in layers.iter().enumerate() {
        let nodes = start_node..layer.end_node_index;
        let connections = start_connection..layer.end_connection_index;
        let consistent = nodes.start < nodes.end
            && nodes.end <= node_depths.len()
            && connections.start <= connections.end
            && connections.end <= sources.len()
            && node_depths[nodes.clone()].iter().all(|d| *d == depth)
            && sources[connections.clone()]
                .iter()
                .all(|s| node_depths[s.0] == depth);
        if !consistent {
            return Err(ValidationError::LayerMismatch { layer: depth });
        }
        start_node = nodes.end;
        start_connection = connections.end;
    }
    if start_node != node_depths.len() || start_connection != sources.len() {
        return Err(ValidationError::LayerMismatch {
            layer: layers.len().saturating_sub(1),
        });
    }
    Ok(())
}

fn is_permutation(indexes: &[usize], len: usize) -> bool {
    if indexes.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for index in indexes {
        match seen.get_mut(*index) {
            Some(seen) if !*seen => *seen = true,
            _ => return false,
        }
    }
    true
}
