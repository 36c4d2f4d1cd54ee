//! End-to-end runs of torque-free and loaded bodies.
//!
//! Run with: cargo test -p rbsim-core --test free_flight

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use nalgebra::Vector3;
use rbsim_core::{LoadingFn, Polyhedron, Simulation, SimulationConfig, Sphere};
use rbsim_types::algebra::{quaternion_about_axis, Axis};
use rbsim_types::{Gravity, Pose, QuaternionExt, SpatialVector};

fn plate() -> Polyhedron {
    Polyhedron::cuboid(4.0, 0.4, 2.6)
}

// =============================================================================
// Torque-free motion
// =============================================================================

#[test]
fn torque_free_tumbling_conserves_energy_and_momentum() {
    let mut sim = Simulation::new();
    sim.add_body(
        0.12,
        plate(),
        Pose::identity(),
        SpatialVector::new(Vector3::new(0.5, 0.0, -0.2), Vector3::new(0.3, 1.0, 0.2)),
    );
    sim.reset();
    let energy0 = sim.total_kinetic_energy();
    let momentum0 = sim.states()[0].momentum;

    let steps = sim.run(2.0).unwrap();
    assert!(steps > 200);

    let energy = sim.total_kinetic_energy();
    assert!(
        ((energy - energy0) / energy0).abs() < 1e-6,
        "energy drifted from {energy0} to {energy}"
    );
    let momentum = sim.states()[0].momentum;
    assert_relative_eq!(momentum.translational, momentum0.translational, epsilon = 1e-12);
    assert_relative_eq!(momentum.rotational, momentum0.rotational, epsilon = 1e-12);
    assert_relative_eq!(sim.states()[0].pose.orientation.norm(), 1.0, epsilon = 1e-12);

    // the body really tumbled: angular velocity moved away from its start
    let omega = sim.body_dynamics(0).unwrap().motion.rotational;
    assert!((omega - Vector3::new(0.3, 1.0, 0.2)).norm() > 1e-3);
}

#[test]
fn single_axis_spin_turns_by_omega_times_t() {
    let omega0 = 2.0;
    let duration = 1.0;
    let mut sim = Simulation::new();
    sim.add_body(
        0.12,
        plate(),
        Pose::identity(),
        SpatialVector::new(Vector3::zeros(), Vector3::new(0.0, 0.0, omega0)),
    );
    sim.run(duration).unwrap();

    let q = sim.states()[0].pose.orientation;
    let expected = quaternion_about_axis(Axis::Z, omega0 * duration);
    assert_relative_eq!(q, expected, epsilon = 1e-8);

    let (axis, angle) = q.to_axis_angle();
    assert_relative_eq!(angle, omega0 * duration, epsilon = 1e-8);
    assert_relative_eq!(axis, Vector3::z(), epsilon = 1e-8);
}

#[test]
fn pure_translation_moves_in_a_straight_line() {
    let mut sim = Simulation::new();
    sim.add_body(
        1.5,
        Sphere::centered(0.2),
        Pose::from_position(Vector3::new(1.0, 1.0, 1.0)),
        SpatialVector::pure_twist(&Vector3::new(-1.0, 0.5, 2.0)),
    );
    sim.run_until(4.0, 8).unwrap();
    assert_relative_eq!(
        sim.states()[0].pose.position,
        Vector3::new(-3.0, 3.0, 9.0),
        epsilon = 1e-12
    );
}

// =============================================================================
// Loaded motion
// =============================================================================

#[test]
fn vertical_throw_under_gravity() {
    // weight acts along the line of motion, so it carries no moment
    let config = SimulationConfig::default().with_gravity(Gravity::custom(Vector3::new(0.0, -10.0, 0.0)));
    let mut sim = Simulation::with_config(config).unwrap();
    sim.add_body(
        1.0,
        Sphere::centered(0.1),
        Pose::identity(),
        SpatialVector::pure_twist(&Vector3::new(0.0, 4.0, 0.0)),
    );
    sim.run_until(0.8, 4).unwrap();

    let state = sim.states()[0];
    let t: f64 = 0.8;
    assert_relative_eq!(state.pose.position.y, 4.0 * t - 5.0 * t * t, epsilon = 1e-12);
    assert_relative_eq!(state.momentum.translational.y, 4.0 - 10.0 * t, epsilon = 1e-12);
    assert_relative_eq!(state.momentum.rotational, Vector3::zeros(), epsilon = 1e-15);
    assert_relative_eq!(state.pose.orientation, Pose::identity().orientation, epsilon = 1e-15);
}

#[test]
fn time_dependent_loading_sees_stage_times() {
    let times = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&times);
    let loading = LoadingFn::new(move |t, _pose, _motion| {
        record.lock().unwrap().push(t);
        SpatialVector::zero()
    });

    let mut sim = Simulation::new();
    sim.add_body(1.0, Sphere::centered(1.0), Pose::identity(), SpatialVector::zero());
    sim.set_loading(0, Some(loading)).unwrap();
    sim.run_until(1.0, 1).unwrap();

    let times = times.lock().unwrap();
    assert_eq!(times.as_slice(), &[0.0, 0.5, 0.5, 1.0]);
}

#[test]
fn stage_orientations_stay_unit_length() {
    let norms = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&norms);
    let loading = LoadingFn::new(move |_, pose, _| {
        record.lock().unwrap().push(pose.orientation.norm());
        SpatialVector::zero()
    });

    let mut sim = Simulation::new();
    sim.add_body(
        0.12,
        plate(),
        Pose::identity(),
        SpatialVector::new(Vector3::zeros(), Vector3::new(3.0, 10.0, 2.0)),
    );
    sim.set_loading(0, Some(loading)).unwrap();
    let steps = sim.run_steps(3).unwrap();

    let norms = norms.lock().unwrap();
    assert_eq!(norms.len(), 4 * steps);
    for (stage, norm) in norms.iter().enumerate() {
        assert!((norm - 1.0).abs() < 1e-14, "stage {stage}: |q| = {norm}");
    }
}

#[test]
fn constant_force_matches_closed_form() {
    // force along x, applied at the body origin which stays on the x axis
    let force = Vector3::new(2.0, 0.0, 0.0);
    let loading = LoadingFn::new(move |_, pose, _| SpatialVector::wrench_at(&force, &pose.position, 0.0));

    let mut sim = Simulation::new();
    sim.add_body(4.0, Sphere::centered(1.0), Pose::identity(), SpatialVector::zero());
    sim.set_loading(0, Some(loading)).unwrap();
    sim.run(3.0).unwrap();

    let state = sim.states()[0];
    // a = F/m = 0.5
    assert_relative_eq!(state.pose.position.x, 0.5 * 0.5 * 9.0, epsilon = 1e-12);
    assert_relative_eq!(state.momentum.translational.x, 2.0 * 3.0, epsilon = 1e-12);
}

// =============================================================================
// Observers
// =============================================================================

#[test]
fn observers_see_monotonic_time() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);

    let mut sim = Simulation::new();
    sim.add_body(
        0.12,
        plate(),
        Pose::identity(),
        SpatialVector::new(Vector3::zeros(), Vector3::new(0.0, 1.0, 0.0)),
    );
    sim.on_step(move |s| record.lock().unwrap().push(s.time()));

    let steps = sim.run(0.1).unwrap();
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), steps + 1);
    assert_eq!(seen[0], 0.0);
    assert_eq!(*seen.last().unwrap(), 0.1);
    assert!(seen.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn second_run_continues_from_current_time() {
    let mut sim = Simulation::new();
    sim.add_body(
        1.0,
        Sphere::centered(1.0),
        Pose::identity(),
        SpatialVector::pure_twist(&Vector3::x()),
    );
    sim.run(1.0).unwrap();
    sim.run(2.5).unwrap();
    assert_eq!(sim.time(), 2.5);
    assert_relative_eq!(sim.states()[0].pose.position.x, 2.5, epsilon = 1e-12);

    sim.reset();
    assert_eq!(sim.time(), 0.0);
    assert_eq!(sim.states()[0].pose.position, Vector3::zeros());
}
