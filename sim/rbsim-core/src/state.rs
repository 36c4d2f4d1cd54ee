//! Integrated per-body state.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use rbsim_types::{Pose, QuaternionExt, SpatialVector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::body::RigidBody;
use crate::dynamics::BodyDynamics;

/// Pose and momentum of one body at one instant.
///
/// Momentum is about the body's local origin, in world axes. The same type
/// holds time derivatives during integration: the pose becomes
/// `(velocity, ½·ω·q)` and the momentum becomes the applied wrench.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyState {
    /// World pose of the body frame.
    pub pose: Pose,
    /// Linear momentum and angular momentum about the body origin.
    pub momentum: SpatialVector,
}

impl BodyState {
    /// Create a state.
    #[must_use]
    pub fn new(pose: Pose, momentum: SpatialVector) -> Self {
        Self { pose, momentum }
    }

    /// State of `body` at time zero.
    #[must_use]
    pub fn initial(body: &RigidBody) -> Self {
        let pose = body.initial_pose();
        let momentum = body.momentum(&pose.orientation, &body.initial_motion());
        Self::new(pose, momentum)
    }

    /// Same state with a unit orientation.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self::new(self.pose.normalized(), self.momentum)
    }

    /// `self + rate·h`, component-wise.
    #[must_use]
    pub fn add_scaled(&self, rate: &Self, h: f64) -> Self {
        Self::new(
            self.pose + rate.pose * h,
            self.momentum.add_scaled(&rate.momentum, h),
        )
    }

    /// `self·factor`, component-wise.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.pose * factor, self.momentum * factor)
    }

    /// Snapshot of the derived dynamic quantities for `body`.
    #[must_use]
    pub fn dynamics(&self, body: &RigidBody) -> BodyDynamics {
        BodyDynamics::new(body, self)
    }

    /// Pose and momentum tolerance-equal.
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.pose.approx_eq(&other.pose) && self.momentum.approx_eq(&other.momentum)
    }

    /// No component is `NaN` or infinite.
    #[must_use]
    pub fn all_finite(&self) -> bool {
        self.pose.all_finite() && self.momentum.all_finite()
    }
}

impl Add for BodyState {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.pose + rhs.pose, self.momentum + rhs.momentum)
    }
}

impl Sub for BodyState {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.pose - rhs.pose, self.momentum - rhs.momentum)
    }
}

impl Mul<f64> for BodyState {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scaled(rhs)
    }
}

impl Mul<BodyState> for f64 {
    type Output = BodyState;

    fn mul(self, rhs: BodyState) -> BodyState {
        rhs.scaled(self)
    }
}

impl fmt::Display for BodyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.pose.position;
        let (_, angle) = self.pose.orientation.to_axis_angle();
        let p = &self.momentum.translational;
        let l = &self.momentum.rotational;
        write!(
            f,
            "BodyState(r=[{:.3},{:.3},{:.3}] θ={:.1}° p=[{:.3},{:.3},{:.3}] L=[{:.3},{:.3},{:.3}])",
            r.x,
            r.y,
            r.z,
            angle.to_degrees(),
            p.x,
            p.y,
            p.z,
            l.x,
            l.y,
            l.z
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::geometry::Sphere;
    use approx::assert_relative_eq;
    use nalgebra::{Quaternion, Vector3};

    fn state() -> BodyState {
        BodyState::new(
            Pose::new(Vector3::new(1.0, 2.0, 3.0), Quaternion::new(2.0, 0.0, 0.0, 0.0)),
            SpatialVector::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
        )
    }

    #[test]
    fn test_initial_state() {
        let body = RigidBody::new(
            2.0,
            Sphere::centered(1.0),
            Pose::from_position(Vector3::new(0.0, 0.0, 5.0)),
            SpatialVector::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 2.0)),
        );
        let s = BodyState::initial(&body);
        assert_eq!(s.pose, body.initial_pose());
        assert_relative_eq!(s.momentum.translational, Vector3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(s.momentum.rotational, Vector3::new(0.0, 0.0, 2.0 * 0.8), epsilon = 1e-12);
    }

    #[test]
    fn test_normalized_only_touches_orientation() {
        let s = state().normalized();
        assert_relative_eq!(s.pose.orientation.norm(), 1.0);
        assert_eq!(s.pose.position, state().pose.position);
        assert_eq!(s.momentum, state().momentum);
    }

    #[test]
    fn test_add_scaled() {
        let a = state();
        let b = state().scaled(0.5);
        let c = a.add_scaled(&b, 2.0);
        assert!(c.approx_eq(&(a * 2.0)));
        assert!((a + b - b).approx_eq(&a));
        assert!((2.0 * a).approx_eq(&a.scaled(2.0)));
    }

    #[test]
    fn test_finiteness() {
        assert!(state().all_finite());
        let mut bad = state();
        bad.momentum.rotational.x = f64::NAN;
        assert!(!bad.all_finite());
    }

    #[test]
    fn test_display() {
        let text = BodyState::default().to_string();
        assert!(text.starts_with("BodyState(r=[0.000,0.000,0.000]"));
    }
}
