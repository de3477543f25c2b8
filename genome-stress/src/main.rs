use oxineat_graph::genomics::{
    validate, ConnectionGene, ConnectionGenes, Genome, GenomeBuilder, MetaGenome,
    ValidationError,
};
use oxineat_graph::graphs::{GraphError, NodeIndex};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use std::collections::HashSet;
use std::error::Error;
use std::fs;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

/// Stress run parameters, read from the RON file given as
/// the first argument. Missing fields take their defaults.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
struct StressConfig {
    meta: MetaGenome,
    genome_count: usize,
    hidden_node_count: usize,
    connection_count: usize,
    offspring_per_genome: usize,
    validation_interval: usize,
    seed: u64,
}

impl Default for StressConfig {
    fn default() -> Self {
        StressConfig {
            meta: MetaGenome {
                input_count: NonZeroUsize::new(3).unwrap(),
                output_count: NonZeroUsize::new(1).unwrap(),
                is_acyclic: true,
                connection_weight_scale: 5.0,
                ..MetaGenome::zero()
            },
            genome_count: 20000,
            hidden_node_count: 40,
            connection_count: 150,
            offspring_per_genome: 4,
            validation_interval: 100,
            seed: 0,
        }
    }
}

struct GenomeReport {
    complexity: usize,
    hidden_node_count: usize,
    network_depth: Option<usize>,
    output_sum: f32,
    validation: Option<Result<(), ValidationError>>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ron::from_str(&fs::read_to_string(path)?)?,
        None => StressConfig::default(),
    };
    info!(?config, "loaded stress configuration");

    stress_test(&config)?;
    serde_test(&config)?;
    Ok(())
}

/// Returns random genes in random order. Inputs are never targeted.
/// Feed-forward genes only connect nodes in increasing rank, with
/// inputs ranked first.
fn random_genes(rng: &mut StdRng, config: &StressConfig) -> ConnectionGenes {
    let input_count = config.meta.input_count.get();
    let io_count = config.meta.input_output_count();
    let mut ranked: Vec<usize> = (input_count..io_count)
        .chain((0..config.hidden_node_count).map(|i| io_count + 2 * i))
        .collect();
    ranked.shuffle(rng);
    let ranked: Vec<usize> = (0..input_count).chain(ranked).collect();

    let scale = config.meta.connection_weight_scale;
    let mut seen = HashSet::new();
    let mut genes = Vec::with_capacity(config.connection_count);
    for innovation in 0..config.connection_count * 4 {
        if genes.len() == config.connection_count {
            break;
        }
        let target = rng.gen_range(input_count..ranked.len());
        let source = if config.meta.is_acyclic {
            rng.gen_range(0..target)
        } else {
            rng.gen_range(0..ranked.len())
        };
        if seen.insert((ranked[source], ranked[target])) {
            genes.push(ConnectionGene::new(
                innovation,
                ranked[source],
                ranked[target],
                rng.gen_range(-scale..=scale),
            ));
        }
    }
    genes.shuffle(rng);
    genes.into_iter().collect()
}

/// Runs a feed-forward pass with every input set to `input`,
/// returning the sum of the outputs. Cyclic genomes yield 0.
fn evaluate(genome: &Genome, input: f32) -> f32 {
    let graph = match genome.acyclic_graph() {
        Some(graph) => graph,
        None => return 0.0,
    };
    let activation = genome.meta().activation_type;
    let weights = genome.digraph_weights();
    let digraph = graph.graph();

    let mut sums = vec![0.0; digraph.total_node_count()];
    for sum in &mut sums[..digraph.input_count()] {
        *sum = input;
    }
    // Sources always come before their targets in depth order.
    for node in 0..digraph.total_node_count() {
        if node >= digraph.input_count() {
            sums[node] = activation.activate(sums[node]);
        }
        let value = sums[node];
        for i in digraph.connection_range(NodeIndex(node)) {
            sums[digraph.target_indexes()[i].0] += value * weights[i];
        }
    }
    graph.output_node_indexes().iter().map(|o| sums[o.0]).sum()
}

fn build_and_report(
    builder: &mut GenomeBuilder,
    config: &StressConfig,
    index: usize,
) -> Result<GenomeReport, GraphError> {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index as u64));
    let parent = builder.create(index, 0, random_genes(&mut rng, config))?;

    let mut output_sum = evaluate(&parent, 1.0);
    let mut last = parent.clone();
    for generation in 1..=config.offspring_per_genome {
        let weights = parent
            .genes()
            .weights()
            .iter()
            .map(|w| *w + rng.gen_range(-0.1f32..0.1))
            .collect();
        last = parent.with_weights(index, generation, weights);
        debug_assert!(Arc::ptr_eq(parent.topology(), last.topology()));
        output_sum += evaluate(&last, 1.0);
    }

    let validation = (config.validation_interval > 0 && index % config.validation_interval == 0)
        .then(|| validate(&parent).and_then(|_| validate(&last)));

    Ok(GenomeReport {
        complexity: parent.complexity(),
        hidden_node_count: parent.hidden_node_ids().len(),
        network_depth: parent.depth_info().map(|d| d.network_depth()),
        output_sum,
        validation,
    })
}

fn stress_test(config: &StressConfig) -> Result<(), Box<dyn Error>> {
    let meta = Arc::new(config.meta.clone());
    let start = Instant::now();

    let reports: Vec<Result<GenomeReport, GraphError>> = (0..config.genome_count)
        .into_par_iter()
        .map_init(
            || GenomeBuilder::new(Arc::clone(&meta)),
            |builder, index| build_and_report(builder, config, index),
        )
        .collect();

    let elapsed = start.elapsed();
    let mut built = 0;
    let mut validated = 0;
    let (mut connections, mut hidden, mut max_depth, mut output_sum) = (0, 0, 0, 0.0);
    for (index, report) in reports.into_iter().enumerate() {
        let report = match report {
            Ok(report) => report,
            Err(e) => {
                warn!(genome = index, error = %e, "genome failed to compile");
                continue;
            }
        };
        if let Some(validation) = report.validation {
            validation?;
            validated += 1;
        }
        built += 1;
        connections += report.complexity;
        hidden += report.hidden_node_count;
        max_depth = max_depth.max(report.network_depth.unwrap_or(0));
        output_sum += report.output_sum;
    }
    debug!(output_sum, "evaluation checksum");

    let genomes = built * (config.offspring_per_genome + 1);
    println!(
        "Built {} of {} genomes ({} with offspring) in {:?}, {:.0} genomes/s",
        built,
        config.genome_count,
        genomes,
        elapsed,
        genomes as f64 / elapsed.as_secs_f64()
    );
    if built > 0 {
        println!(
            "Mean connections {:.1}, mean hidden nodes {:.1}, max network depth {}, {} validated",
            connections as f32 / built as f32,
            hidden as f32 / built as f32,
            max_depth,
            validated
        );
    }
    Ok(())
}

fn serde_test(config: &StressConfig) -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut builder = GenomeBuilder::new(Arc::new(config.meta.clone()));
    let genome = builder.create(0, 0, random_genes(&mut rng, config))?;

    let serialized = ron::to_string(&(genome.meta().as_ref(), genome.genes()))?;
    let (meta, genes): (MetaGenome, ConnectionGenes) = ron::from_str(&serialized)?;
    let rebuilt = GenomeBuilder::new(Arc::new(meta)).create(0, 0, genes)?;

    if rebuilt != genome {
        return Err("genome rebuilt from RON differs from the original".into());
    }
    info!(bytes = serialized.len(), "RON round trip rebuilt an identical genome");
    Ok(())
}
