//! Property tests over randomly generated genomes.

use oxineat_graph::genomics::{
    validate, ConnectionGene, ConnectionGenes, Genome, GenomeBuilder, MetaGenome, NodeId,
};
use oxineat_graph::graphs::{
    CyclicConnectionCheck, CyclicGraphCheck, GraphError, NodeIdMap, NodeIndex,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct GenomeShape {
    seed: u64,
    input_count: usize,
    output_count: usize,
    hidden_count: usize,
    connection_count: usize,
}

prop_compose! {
    fn arb_shape()(
        seed in any::<u64>(),
        input_count in 1..6usize,
        output_count in 1..4usize,
        hidden_count in 0..20usize,
        connection_count in 0..60usize,
    ) -> GenomeShape {
        GenomeShape { seed, input_count, output_count, hidden_count, connection_count }
    }
}

fn meta(shape: &GenomeShape, is_acyclic: bool) -> Arc<MetaGenome> {
    Arc::new(MetaGenome {
        input_count: NonZeroUsize::new(shape.input_count).unwrap(),
        output_count: NonZeroUsize::new(shape.output_count).unwrap(),
        is_acyclic,
        ..MetaGenome::zero()
    })
}

/// Returns random, unsorted genes. Inputs are never targeted.
/// Feed-forward genes only connect nodes in increasing rank,
/// with inputs ranked first.
fn random_genes(shape: &GenomeShape, feed_forward: bool) -> ConnectionGenes {
    let mut rng = StdRng::seed_from_u64(shape.seed);
    let io_count = shape.input_count + shape.output_count;
    let mut ranked: Vec<usize> = (shape.input_count..io_count)
        .chain((0..shape.hidden_count).map(|i| io_count + 3 * i + 1))
        .collect();
    ranked.shuffle(&mut rng);
    let ranked: Vec<usize> = (0..shape.input_count).chain(ranked).collect();

    let mut innovations: Vec<usize> = (0..shape.connection_count * 2).collect();
    innovations.shuffle(&mut rng);

    let mut seen = HashSet::new();
    let mut genes = Vec::new();
    // Bounded, since small graphs may not fit every connection.
    for _ in 0..shape.connection_count * 4 {
        if genes.len() == shape.connection_count {
            break;
        }
        let target = rng.gen_range(shape.input_count..ranked.len());
        let source = if feed_forward {
            rng.gen_range(0..target)
        } else {
            rng.gen_range(0..ranked.len())
        };
        if seen.insert((ranked[source], ranked[target])) {
            genes.push(ConnectionGene::new(
                innovations[genes.len()],
                ranked[source],
                ranked[target],
                rng.gen_range(-1.0..1.0),
            ));
        }
    }
    genes.into_iter().collect()
}

fn build(shape: &GenomeShape, is_acyclic: bool) -> Genome {
    GenomeBuilder::new(meta(shape, is_acyclic))
        .create(0, 0, random_genes(shape, is_acyclic))
        .unwrap()
}

proptest! {
    #[test]
    fn built_genomes_validate(shape in arb_shape()) {
        prop_assert_eq!(validate(&build(&shape, false)), Ok(()));
        prop_assert_eq!(validate(&build(&shape, true)), Ok(()));
    }

    #[test]
    fn connections_of_covers_every_connection(shape in arb_shape(), is_acyclic in any::<bool>()) {
        let genome = build(&shape, is_acyclic);
        let graph = genome.directed_graph();
        let mut targets = Vec::new();
        for node in 0..graph.total_node_count() {
            let node = NodeIndex(node);
            for i in graph.connection_range(node) {
                prop_assert_eq!(graph.source_indexes()[i], node);
            }
            targets.extend_from_slice(graph.connections_of(node));
        }
        prop_assert_eq!(targets.as_slice(), graph.target_indexes());
    }

    #[test]
    fn depth_ordering_is_monotonic(shape in arb_shape()) {
        let genome = build(&shape, true);
        let graph = genome.acyclic_graph().unwrap();
        let depths = graph.node_depths();
        prop_assert!(depths.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(depths[..graph.graph().input_count()].iter().all(|d| *d == 0));
        for (source, target) in graph
            .graph()
            .source_indexes()
            .iter()
            .zip(graph.graph().target_indexes())
        {
            prop_assert!(depths[source.0] < depths[target.0]);
        }
    }

    #[test]
    fn connection_index_map_is_a_bijection(shape in arb_shape()) {
        let genome = build(&shape, true);
        let map = genome.connection_index_map().unwrap();
        let mut sorted = map.to_vec();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..genome.complexity()).collect::<Vec<_>>());

        let weights = genome.digraph_weights();
        for (i, gene) in map.iter().enumerate() {
            prop_assert_eq!(weights[i], genome.genes().weights()[*gene]);
        }
    }

    #[test]
    fn back_edges_close_cycles(shape in arb_shape()) {
        let genome = build(&shape, true);
        prop_assert!(!CyclicGraphCheck::new().is_cyclic(genome.directed_graph()));

        let input_count = shape.input_count;
        let back_edge = genome
            .genes()
            .connections()
            .iter()
            .find(|c| c.source.0 >= input_count)
            .copied();
        if let Some(connection) = back_edge {
            let mut check = CyclicConnectionCheck::new();
            prop_assert!(genome.is_connection_cyclic(
                connection.target,
                connection.source,
                &mut check
            ));

            let mut genes: Vec<ConnectionGene> = genome.genes().iter().collect();
            genes.push(ConnectionGene::new(
                usize::MAX,
                connection.target.0,
                connection.source.0,
                1.0,
            ));
            let cyclic = GenomeBuilder::new(meta(&shape, false))
                .create(1, 0, genes.iter().copied().collect())
                .unwrap();
            prop_assert!(CyclicGraphCheck::new().is_cyclic(cyclic.directed_graph()));

            let result = GenomeBuilder::new(meta(&shape, true))
                .create(1, 0, genes.into_iter().collect());
            prop_assert!(
                matches!(result, Err(GraphError::CyclicGraph { .. })),
                "expected CyclicGraph error, got {:?}",
                result
            );
        }
    }

    #[test]
    fn compilation_is_deterministic(shape in arb_shape(), is_acyclic in any::<bool>()) {
        let genes = random_genes(&shape, is_acyclic);
        let mut shuffled: Vec<ConnectionGene> = genes.iter().collect();
        shuffled.shuffle(&mut StdRng::seed_from_u64(shape.seed ^ 1));

        let mut builder = GenomeBuilder::new(meta(&shape, is_acyclic));
        let first = builder.create(0, 0, genes.clone()).unwrap();
        let second = builder.create(0, 0, genes).unwrap();
        let third = builder.create(0, 0, shuffled.into_iter().collect()).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &third);
    }

    #[test]
    fn hidden_nodes_map_past_fixed_nodes(shape in arb_shape()) {
        let genome = build(&shape, false);
        let io_count = shape.input_count + shape.output_count;
        let map = genome.node_index_map();
        for (i, id) in genome.hidden_node_ids().iter().enumerate() {
            prop_assert!(genome.contains_hidden_node(*id));
            prop_assert_eq!(
                map.map(*id),
                NodeIndex(io_count + i)
            );
        }
        prop_assert!(!genome.contains_hidden_node(NodeId(0)));
    }
}
