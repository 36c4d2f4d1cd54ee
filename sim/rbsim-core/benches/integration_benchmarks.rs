//! Benchmarks for the RK4 stepper and mass-property evaluation.
//!
//! Run with: cargo bench -p rbsim-core

#![allow(missing_docs, clippy::wildcard_imports, clippy::cast_precision_loss)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nalgebra::Vector3;

use rbsim_core::{Polyhedron, Simulation, SimulationConfig};
use rbsim_types::algebra::quaternion_from_axis_angle;
use rbsim_types::{Pose, SpatialVector};

/// Tumbling plates laid out on a line.
fn build_scene(bodies: usize) -> Simulation {
    let mut sim = Simulation::with_config(SimulationConfig::earth()).unwrap_or_default();
    for i in 0..bodies {
        let x = i as f64;
        sim.add_body(
            0.12,
            Polyhedron::cuboid(4.0, 0.4, 2.6),
            Pose::new(
                Vector3::new(x, 0.0, 0.0),
                quaternion_from_axis_angle(&Vector3::new(1.0, 1.0, 0.0), 0.1 * x),
            ),
            SpatialVector::new(Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.3, 1.0, 0.2)),
        );
    }
    sim.reset();
    sim
}

/// Benchmark a single RK4 step against the number of bodies.
fn bench_rk4_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("rk4_step");

    for bodies in [1, 8, 64, 256] {
        let sim = build_scene(bodies);
        let h = sim.estimate_max_time_step();

        group.throughput(Throughput::Elements(bodies as u64));
        group.bench_with_input(BenchmarkId::new("bodies", bodies), &sim, |b, sim| {
            b.iter(|| black_box(sim.integrate(sim.states(), black_box(h))));
        });
    }

    group.finish();
}

/// Benchmark a full second of simulated time for one tumbling body.
fn bench_run_one_second(c: &mut Criterion) {
    c.bench_function("run_one_second", |b| {
        b.iter(|| {
            let mut sim = build_scene(1);
            black_box(sim.run(1.0))
        });
    });
}

/// Benchmark mesh mass properties.
fn bench_volume_properties(c: &mut Criterion) {
    let mut group = c.benchmark_group("volume_properties");

    let shapes = [
        ("cuboid", Polyhedron::cuboid(4.0, 0.4, 2.6)),
        ("pyramid", Polyhedron::pyramid(2.0, 3.0)),
    ];
    for (name, mesh) in &shapes {
        group.bench_with_input(BenchmarkId::new("mesh", name), mesh, |b, mesh| {
            b.iter(|| black_box(mesh.volume_properties()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rk4_step,
    bench_run_one_second,
    bench_volume_properties,
);
criterion_main!(benches);
