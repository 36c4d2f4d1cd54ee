//! Runge-Kutta engine for free rigid bodies.
//!
//! This crate advances unconstrained rigid bodies under uniform gravity and
//! user-supplied loading. State is integrated in momentum form (pose plus
//! linear and angular momentum) with the classical fourth-order Runge-Kutta
//! method, and sub-steps are bounded so no body turns more than half a degree
//! per step.
//!
//! # Modules
//!
//! - [`geometry`] - [`Solid`] shapes ([`Sphere`], [`Polyhedron`]) that supply
//!   volume, centroid and inertia
//! - [`RigidBody`] - mass properties and the Newton-Euler relations between
//!   motion, momentum, loading and acceleration
//! - [`BodyState`] - pose and momentum, the integrated quantity
//! - [`BodyDynamics`] - per-state snapshot with forward and inverse solvers
//! - [`Simulation`] - owns bodies and states, runs the integrator
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Simulation                                              │
//! │   bodies: Vec<RigidBody>    states: Vec<BodyState>      │
//! │   run / run_until / run_steps                           │
//! │     └─ integrate (RK4) ─ rates ─┐                       │
//! │                                 ▼                       │
//! │        BodyDynamics::new(body, state)                   │
//! │          motion = f(momentum)                           │
//! │          loading = weight + LoadingFn                   │
//! │          momentum_rate(loading) → (v, ½ωq | F, τ)       │
//! ├─────────────────────────────────────────────────────────┤
//! │ RigidBody ← Solid (Sphere, Polyhedron)                  │
//! ├─────────────────────────────────────────────────────────┤
//! │ rbsim-types: SpatialVector, Pose, algebra               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use rbsim_core::{Polyhedron, Simulation};
//! use rbsim_types::{Pose, SpatialVector, Vector3};
//!
//! let mut sim = Simulation::new();
//! sim.add_body(
//!     0.12,
//!     Polyhedron::cuboid(4.0, 0.4, 2.6),
//!     Pose::identity(),
//!     SpatialVector::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
//! );
//!
//! let steps = sim.run(1.0).unwrap();
//! assert!(steps > 100);
//! assert!((sim.time() - 1.0).abs() < 1e-12);
//! sim.check_finite().unwrap();
//! ```
//!
//! # Features
//!
//! - `parallel` - evaluate per-body rates on the rayon pool
//! - `serde` - serialize states and configuration

#![doc(html_root_url = "https://docs.rs/rbsim-core/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::cast_precision_loss,       // usize to f64 is fine for counts
    clippy::missing_errors_doc,        // Error docs added where non-obvious
    clippy::wrong_self_convention,     // from_local/to_local name frames, not constructors
    clippy::many_single_char_names,    // a, c, f, p, w follow the math
)]

mod body;
mod callbacks;
mod dynamics;
pub mod geometry;
mod simulation;
mod state;

pub use body::RigidBody;
pub use callbacks::{Callback, CollisionHook, LoadingFn};
pub use dynamics::{BodyDynamics, PinSolution, SliderSolution};
pub use geometry::{Polyhedron, Solid, Sphere, VolumeProperties};
pub use simulation::{Simulation, StepObserver};
pub use state::BodyState;

pub use rbsim_types::{
    Gravity, ParallelConfig, Pose, Result, SimError, SimulationConfig, SpatialVector,
};
