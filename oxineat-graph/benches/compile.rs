use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use oxineat_graph::genomics::{ConnectionGene, ConnectionGenes, GenomeBuilder, MetaGenome};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

const INPUTS: usize = 8;
const OUTPUTS: usize = 4;

fn meta(is_acyclic: bool) -> Arc<MetaGenome> {
    Arc::new(MetaGenome {
        input_count: NonZeroUsize::new(INPUTS).unwrap(),
        output_count: NonZeroUsize::new(OUTPUTS).unwrap(),
        is_acyclic,
        connection_weight_scale: 5.0,
        ..MetaGenome::zero()
    })
}

/// Random feed-forward genes, in random order. Nodes are ranked
/// inputs first, and connections only run from lower to higher rank.
fn random_genes(rng: &mut StdRng, hidden_count: usize, connection_count: usize) -> ConnectionGenes {
    let io_count = INPUTS + OUTPUTS;
    let mut ranked: Vec<usize> = (INPUTS..io_count)
        .chain((0..hidden_count).map(|i| io_count + 2 * i))
        .collect();
    ranked.shuffle(rng);
    let ranked: Vec<usize> = (0..INPUTS).chain(ranked).collect();

    let mut seen = HashSet::new();
    let mut genes = Vec::with_capacity(connection_count);
    while genes.len() < connection_count {
        let target = rng.gen_range(INPUTS..ranked.len());
        let source = rng.gen_range(0..target);
        if seen.insert((ranked[source], ranked[target])) {
            genes.push(ConnectionGene::new(
                genes.len(),
                ranked[source],
                ranked[target],
                rng.gen_range(-5.0..5.0),
            ));
        }
    }
    genes.shuffle(rng);
    genes.into_iter().collect()
}

// Sorts by computing a permutation, then copying every array through it.
fn sort_by_permutation(genes: &ConnectionGenes) -> ConnectionGenes {
    let connections = genes.connections();
    let mut order: Vec<usize> = (0..genes.len()).collect();
    order.sort_unstable_by_key(|i| connections[*i]);
    ConnectionGenes::from_parts(
        order.iter().map(|i| connections[*i]).collect(),
        order.iter().map(|i| genes.weights()[*i]).collect(),
        order.iter().map(|i| genes.innovations()[*i]).collect(),
    )
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");
    let mut rng = StdRng::seed_from_u64(0);
    for size in [50, 500, 5000] {
        let genes = random_genes(&mut rng, size / 4, size);
        group.bench_with_input(BenchmarkId::new("in_place", size), &genes, |b, genes| {
            b.iter_batched(
                || genes.clone(),
                |mut genes| {
                    genes.sort();
                    genes
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("permutation", size), &genes, |b, genes| {
            b.iter(|| sort_by_permutation(black_box(genes)))
        });
    }
    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let mut rng = StdRng::seed_from_u64(1);
    for size in [50, 500, 5000] {
        let mut genes = random_genes(&mut rng, size / 4, size);
        genes.sort();
        for (name, is_acyclic) in [("cyclic", false), ("acyclic", true)] {
            let mut builder = GenomeBuilder::new(meta(is_acyclic));
            group.bench_with_input(BenchmarkId::new(name, size), &genes, |b, genes| {
                b.iter(|| builder.create(0, 0, genes.clone()).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_weight_offspring(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let genes = random_genes(&mut rng, 125, 500);
    let parent = GenomeBuilder::new(meta(true))
        .create(0, 0, genes)
        .unwrap();

    c.bench_function("weight_offspring_500", |b| {
        b.iter(|| {
            let weights = parent.genes().weights().iter().map(|w| w * 0.5).collect();
            black_box(parent.with_weights(1, 1, weights))
        })
    });
}

criterion_group!(benches, bench_sort, bench_compile, bench_weight_offspring);
criterion_main!(benches);
