use criterion::{criterion_group, criterion_main, Criterion};
use housing_core::{grid_regions, SimConfig};
use housing_runtime::{run_ticks_in_place, Simulation};

fn bench_ticks(c: &mut Criterion) {
    let config = SimConfig {
        init_num_people: 4,
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(grid_regions(20, 20, 1.0), config).unwrap();
    c.bench_function("sim_tick_400_regions", |b| {
        b.iter(|| {
            let _ = run_ticks_in_place(&mut sim, 1);
        })
    });
}

fn bench_setup(c: &mut Criterion) {
    c.bench_function("setup_400_regions", |b| {
        b.iter(|| {
            let geometries = grid_regions(20, 20, 1.0);
            Simulation::new(geometries, SimConfig::default())
        })
    });
}

criterion_group!(benches, bench_ticks, bench_setup);
criterion_main!(benches);
