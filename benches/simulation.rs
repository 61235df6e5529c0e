//! Performance benchmarks for savanna

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use savanna::{Config, World, DEFAULT_DT};

fn benchmark_world_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_step");

    for creatures in [10, 50, 200].iter() {
        let mut config = Config::default();
        config.world.initial_creatures = *creatures;

        let mut world = World::new_with_seed(config, 42);

        // Warm up
        world.run(10, DEFAULT_DT);

        group.bench_with_input(
            BenchmarkId::new("creatures", creatures),
            creatures,
            |b, _| {
                b.iter(|| {
                    world.step(DEFAULT_DT);
                });
            },
        );
    }

    group.finish();
}

fn benchmark_crossover(c: &mut Criterion) {
    use savanna::Genome;

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let a = Genome::random(&mut rng);
    let b = Genome::random(&mut rng);

    c.bench_function("genome_crossover", |bench| {
        bench.iter(|| Genome::crossover_and_mutate(black_box(&a), black_box(&b), &mut rng));
    });
}

fn benchmark_q_update(c: &mut Criterion) {
    use savanna::QTable;

    let mut q = QTable::new();

    c.bench_function("q_update", |bench| {
        bench.iter(|| {
            q.update(black_box(1), black_box(2), black_box(0.5), black_box(3));
        });
    });
}

criterion_group!(
    benches,
    benchmark_world_step,
    benchmark_crossover,
    benchmark_q_update
);
criterion_main!(benches);
