use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use plife_core::engine::Simulation;
use plife_core::systems::motion_system;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn world(count: usize) -> Simulation {
    let mut sim = Simulation::new(800.0, 600.0);
    let mut rng = StdRng::seed_from_u64(42);
    sim.generate_random_world_with(count, &mut rng, &mut ());
    sim
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    for count in [100usize, 500, 1000] {
        let sim = world(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &sim, |b, sim| {
            b.iter_batched(
                || sim.clone(),
                |mut sim| {
                    sim.update();
                    black_box(sim)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_motion_system(c: &mut Criterion) {
    let sim = world(500);

    c.bench_function("motion_system_500", |b| {
        b.iter(|| black_box(motion_system(sim.particles(), sim.matrix())))
    });
}

criterion_group!(benches, bench_update, bench_motion_system);
criterion_main!(benches);
