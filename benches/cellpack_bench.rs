//! Criterion benchmarks for spread evaluation and trial throughput.
//!
//! Inventories are synthetic: impedances are drawn uniformly from
//! 2.0 to 2.5 mΩ with a fixed seed.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_cellpack::balance::{BalanceConfig, BalanceRunner, Strategy};
use u_cellpack::ingest::{build_inventory, IngestConfig};
use u_cellpack::model::{Cell, Inventory};
use u_cellpack::random::create_rng;

fn synthetic_inventory(packs: usize, per_pack: usize) -> Inventory {
    let mut rng = create_rng(42);
    let cells: Vec<Cell> = (0..packs * per_pack)
        .map(|i| Cell::new(format!("c{i}"), rng.random_range(0.0020..0.0025)))
        .collect();
    build_inventory(cells, &IngestConfig::default().with_cells_per_pack(per_pack))
        .expect("pack count divides evenly")
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_average_spread(c: &mut Criterion) {
    let mut group = c.benchmark_group("average_spread");

    for &packs in &[10usize, 100, 1000] {
        let inv = synthetic_inventory(packs, 12);
        group.bench_with_input(BenchmarkId::from_parameter(packs), &inv, |b, inv| {
            b.iter(|| black_box(inv.average_spread()))
        });
    }
    group.finish();
}

fn bench_trials(c: &mut Criterion) {
    let mut group = c.benchmark_group("trials_1000");
    group.sample_size(10);

    for strategy in [Strategy::RandomPair, Strategy::WorstFirst] {
        for &packs in &[10usize, 100] {
            let inv = synthetic_inventory(packs, 12);
            let config = BalanceConfig::default()
                .with_strategy(strategy)
                .with_max_trials(1000)
                .with_seed(42);
            group.bench_with_input(
                BenchmarkId::new(strategy.name(), packs),
                &(inv, config),
                |b, (inv, config)| {
                    b.iter(|| {
                        let mut inv = inv.clone();
                        let result = BalanceRunner::run(&mut inv, black_box(config));
                        black_box(result)
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_average_spread, bench_trials);
criterion_main!(benches);
