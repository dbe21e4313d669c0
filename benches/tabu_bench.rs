//! Criterion benchmarks for fitness evaluation and the tabu search loop.
//!
//! Uses seeded synthetic instances so timings are comparable across runs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qap_tabu::problem::ProblemInstance;
use qap_tabu::tabu::{NeighborhoodStrategy, SearchEngine, TabuConfig};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn synthetic_instance(n: usize, seed: u64) -> ProblemInstance {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut distance = vec![vec![0u64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = rng.random_range(1..100);
            distance[i][j] = d;
            distance[j][i] = d;
        }
    }
    let flow = (0..n)
        .map(|_| (0..n).map(|_| rng.random_range(0..100)).collect())
        .collect();
    ProblemInstance::new(distance, flow).expect("synthetic instance is square")
}

fn bench_fitness(c: &mut Criterion) {
    let mut group = c.benchmark_group("fitness");
    for n in [12, 30, 100] {
        let instance = synthetic_instance(n, 7);
        let mut perm: Vec<usize> = (0..n).collect();
        perm.shuffle(&mut ChaCha8Rng::seed_from_u64(1));
        group.bench_with_input(BenchmarkId::from_parameter(n), &perm, |b, perm| {
            b.iter(|| instance.fitness(black_box(perm)).unwrap())
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("tabu_search");
    group.sample_size(20);
    let instance = synthetic_instance(30, 11);
    for strategy in [
        NeighborhoodStrategy::Swap,
        NeighborhoodStrategy::Reverse,
        NeighborhoodStrategy::Adhoc,
    ] {
        let config = TabuConfig::default()
            .with_max_iterations(500)
            .with_tenure(8)
            .with_strategy(strategy)
            .with_frequency_escalation(true)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::new("n30_500it", format!("{strategy:?}")),
            &config,
            |b, config| {
                b.iter(|| {
                    SearchEngine::new(&instance, config.clone())
                        .unwrap()
                        .run()
                        .unwrap()
                        .best_cost
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_fitness, bench_search);
criterion_main!(benches);
