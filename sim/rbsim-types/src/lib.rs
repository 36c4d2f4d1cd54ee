//! Value types for free rigid-body simulation.
//!
//! This crate provides the algebra the dynamics engine is written in:
//!
//! - [`algebra`] - skew and point-mass inertia operators, cofactor
//!   determinant/inverse, quaternion rotation helpers, tolerances
//! - [`SpatialVector`] - twists, wrenches and momenta as translational/rotational
//!   pairs, with the four spatial cross product conventions
//! - [`Pose`] - position plus (raw) orientation quaternion
//! - [`SimulationConfig`] - gravity, sub-step rotation bound, parallel settings
//! - [`SimError`] - the error type shared by the workspace
//!
//! # Design Philosophy
//!
//! These types are **pure values**. They are small `Copy` aggregates built on
//! `nalgebra`, with no simulation state. The engine in `rbsim-core` owns bodies
//! and time; this crate only knows how to combine vectors.
//!
//! # Layer 0
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ rbsim-core   Simulation, RigidBody, solvers  │
//! ├──────────────────────────────────────────────┤
//! │ rbsim-types  algebra, SpatialVector, Pose    │
//! ├──────────────────────────────────────────────┤
//! │ nalgebra     Vector3, Matrix3, Quaternion    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use rbsim_types::{Pose, SpatialVector};
//! use rbsim_types::algebra::{quaternion_about_axis, Axis};
//! use nalgebra::Vector3;
//!
//! // A frame one unit along X, turned a quarter turn about Z
//! let pose = Pose::new(
//!     Vector3::new(1.0, 0.0, 0.0),
//!     quaternion_about_axis(Axis::Z, std::f64::consts::FRAC_PI_2),
//! );
//! let tip = pose.from_local_point(&Vector3::new(1.0, 0.0, 0.0));
//! assert!((tip - Vector3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
//!
//! // Weight acting at the frame origin, as a wrench about the world origin
//! let weight = SpatialVector::wrench_at(&Vector3::new(0.0, 0.0, -9.81), &pose.position, 0.0);
//! assert!((weight.rotational.y - 9.81).abs() < 1e-12);
//! ```

#![doc(html_root_url = "https://docs.rs/rbsim-types/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for type definitions
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
    clippy::wrong_self_convention,     // from_local/to_local name frames, not constructors
    clippy::many_single_char_names,    // a, b, c, s, v follow the math
)]

pub mod algebra;
mod config;
mod error;
mod pose;
mod spatial;

pub use algebra::{Axis, MatrixExt, QuaternionExt, VectorExt, SMALL, TINY, ULP};
pub use config::{Gravity, ParallelConfig, SimulationConfig, DEFAULT_MAX_STEP_ROTATION};
pub use error::SimError;
pub use pose::Pose;
pub use spatial::{Coordinates, SpatialVector};

// Re-export math types for convenience
pub use nalgebra::{Matrix3, Quaternion, Vector3};

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
