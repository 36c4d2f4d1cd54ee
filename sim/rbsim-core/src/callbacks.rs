//! Callback types for user-supplied hooks.
//!
//! Hooks are stored as `Arc<dyn Fn + Send + Sync>` so bodies stay `Clone`
//! and the per-body rate evaluation can run on the rayon pool.

use std::fmt;
use std::sync::Arc;

use rbsim_types::{Pose, SpatialVector};

use crate::body::RigidBody;
use crate::state::BodyState;

/// Thread-safe callback wrapper that implements Debug.
pub struct Callback<F: ?Sized>(pub Arc<F>);

impl<F: ?Sized> Clone for Callback<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F: ?Sized> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(<fn>)")
    }
}

/// External loading on a body: `(time, world pose, motion) -> wrench`.
///
/// The wrench is about the world origin, the same point the gravity wrench
/// is taken about, and is added to it.
pub type LoadingFn = Callback<dyn Fn(f64, &Pose, &SpatialVector) -> SpatialVector + Send + Sync>;

impl LoadingFn {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64, &Pose, &SpatialVector) -> SpatialVector + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Evaluate the loading.
    #[must_use]
    pub fn evaluate(&self, time: f64, pose: &Pose, motion: &SpatialVector) -> SpatialVector {
        (self.0)(time, pose, motion)
    }
}

/// Collision handling hook: `(time, bodies, next states)`.
///
/// Runs once per sub-step, after integration and before the new states are
/// committed. It may adjust the new states in place.
pub type CollisionHook = Callback<dyn Fn(f64, &[RigidBody], &mut [BodyState]) + Send + Sync>;

impl CollisionHook {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64, &[RigidBody], &mut [BodyState]) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run the hook.
    pub fn apply(&self, time: f64, bodies: &[RigidBody], states: &mut [BodyState]) {
        (self.0)(time, bodies, states);
    }
}
