//! Configuration types for simulation.
//!
//! This module provides the settings that control how a simulation runs:
//! gravity, the rotation bound used to pick sub-step sizes, and parallel
//! evaluation of body rates.

use std::f64::consts::PI;

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default bound on body rotation per sub-step: half a degree.
pub const DEFAULT_MAX_STEP_ROTATION: f64 = PI / 360.0;

/// Main configuration for a simulation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Gravity configuration.
    pub gravity: Gravity,
    /// Largest rotation (radians) any body may turn through in one sub-step.
    pub max_step_rotation: f64,
    /// Parallel evaluation settings.
    pub parallel: ParallelConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: Gravity::zero(),
            max_step_rotation: DEFAULT_MAX_STEP_ROTATION,
            parallel: ParallelConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Default configuration with Earth gravity.
    #[must_use]
    pub fn earth() -> Self {
        Self::default().with_gravity(Gravity::earth())
    }

    /// Set the gravity.
    #[must_use]
    pub fn with_gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = gravity;
        self
    }

    /// Disable gravity (zero-G environment).
    #[must_use]
    pub fn zero_gravity(mut self) -> Self {
        self.gravity = Gravity::zero();
        self
    }

    /// Set the per-sub-step rotation bound.
    #[must_use]
    pub fn with_max_step_rotation(mut self, radians: f64) -> Self {
        self.max_step_rotation = radians;
        self
    }

    /// Set the parallel evaluation settings.
    #[must_use]
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.max_step_rotation.is_finite() || self.max_step_rotation <= 0.0 {
            return Err(crate::SimError::invalid_config(format!(
                "max_step_rotation must be positive and finite, got {}",
                self.max_step_rotation
            )));
        }

        if !self.gravity.acceleration.iter().all(|g| g.is_finite()) {
            return Err(crate::SimError::invalid_config("gravity must be finite"));
        }

        Ok(())
    }
}

/// Gravity configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gravity {
    /// Acceleration due to gravity (m/s²).
    pub acceleration: Vector3<f64>,
}

impl Default for Gravity {
    fn default() -> Self {
        Self::zero()
    }
}

impl Gravity {
    /// Standard Earth gravity (9.81 m/s² in -Z direction).
    #[must_use]
    pub fn earth() -> Self {
        Self {
            acceleration: Vector3::new(0.0, 0.0, -9.81),
        }
    }

    /// Zero gravity (microgravity).
    #[must_use]
    pub fn zero() -> Self {
        Self {
            acceleration: Vector3::zeros(),
        }
    }

    /// Custom gravity vector.
    #[must_use]
    pub fn custom(acceleration: Vector3<f64>) -> Self {
        Self { acceleration }
    }

    /// Weight of a body of the given mass.
    #[must_use]
    pub fn force_on_mass(&self, mass: f64) -> Vector3<f64> {
        self.acceleration * mass
    }
}

/// Settings for evaluating body rates on the rayon thread pool.
///
/// Only takes effect when the `parallel` feature of `rbsim-core` is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParallelConfig {
    /// Evaluate per-body rates in parallel.
    pub enabled: bool,
    /// Below this many bodies the serial path is used.
    pub min_bodies: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_bodies: 64,
        }
    }
}

impl ParallelConfig {
    /// Never go parallel.
    #[must_use]
    pub fn serial() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}
