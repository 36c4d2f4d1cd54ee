//! Position plus orientation of a body frame.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use nalgebra::{Quaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::algebra::{QuaternionExt, VectorExt};

/// Location and orientation of a local frame in world coordinates.
///
/// The orientation is a raw quaternion, not a unit quaternion: poses are also
/// used as the time derivative of a pose inside the integrator, where the
/// "orientation" is `½·ω·q`. The arithmetic operators are therefore
/// component-wise on the position and on the four quaternion components.
/// They are not rigid-transform composition; use [`Pose::from_local`] for
/// that.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Origin of the local frame in world coordinates.
    pub position: Vector3<f64>,
    /// Rotation from local to world.
    pub orientation: Quaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Create a pose.
    #[must_use]
    pub fn new(position: Vector3<f64>, orientation: Quaternion<f64>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// World origin, no rotation.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), Quaternion::identity())
    }

    /// Translation only.
    #[must_use]
    pub fn from_position(position: Vector3<f64>) -> Self {
        Self::new(position, Quaternion::identity())
    }

    /// Rotation only.
    #[must_use]
    pub fn from_orientation(orientation: Quaternion<f64>) -> Self {
        Self::new(Vector3::zeros(), orientation)
    }

    /// Local point to world: `position + q·p`.
    #[must_use]
    pub fn from_local_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.position + self.orientation.rotate_vector(point)
    }

    /// Local direction to world: `q·d`.
    #[must_use]
    pub fn from_local_direction(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        self.orientation.rotate_vector(direction)
    }

    /// Local orientation to world: `orientation * local`.
    #[must_use]
    pub fn from_local_orientation(&self, local: &Quaternion<f64>) -> Quaternion<f64> {
        self.orientation * local
    }

    /// Compose a pose expressed in this frame into world coordinates.
    #[must_use]
    pub fn from_local(&self, local: &Self) -> Self {
        Self::new(
            self.from_local_point(&local.position),
            self.from_local_orientation(&local.orientation),
        )
    }

    /// World point to local: `q⁻¹·(p − position)`.
    #[must_use]
    pub fn to_local_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.orientation
            .reciprocal()
            .rotate_vector(&(point - self.position))
    }

    /// World direction to local: `q⁻¹·d`.
    #[must_use]
    pub fn to_local_direction(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        self.orientation.reciprocal().rotate_vector(direction)
    }

    /// World orientation to local: `world * orientation⁻¹`.
    #[must_use]
    pub fn to_local_orientation(&self, world: &Quaternion<f64>) -> Quaternion<f64> {
        world * self.orientation.reciprocal()
    }

    /// Express a world pose in this frame. Inverse of [`Pose::from_local`]
    /// for the position; orientation follows [`Pose::to_local_orientation`].
    #[must_use]
    pub fn to_local(&self, world: &Self) -> Self {
        Self::new(
            self.to_local_point(&world.position),
            self.to_local_orientation(&world.orientation),
        )
    }

    /// Same position, unit orientation.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self::new(self.position, self.orientation.unit_or_self())
    }

    /// Position and orientation tolerance-equal.
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.position.approx_eq(&other.position) && self.orientation.approx_eq(&other.orientation)
    }

    /// No component is `NaN` or infinite.
    #[must_use]
    pub fn all_finite(&self) -> bool {
        self.position.all_finite() && self.orientation.all_finite()
    }
}

impl Add for Pose {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.position + rhs.position,
            self.orientation + rhs.orientation,
        )
    }
}

impl Sub for Pose {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.position - rhs.position,
            self.orientation - rhs.orientation,
        )
    }
}

impl Neg for Pose {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.position, -self.orientation)
    }
}

impl Mul<f64> for Pose {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.position * rhs, self.orientation * rhs)
    }
}

impl Mul<Pose> for f64 {
    type Output = Pose;

    fn mul(self, rhs: Pose) -> Pose {
        rhs * self
    }
}

impl Div<f64> for Pose {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self * (1.0 / rhs)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (axis, angle) = self.orientation.to_axis_angle();
        write!(
            f,
            "Pose(r=[{:.4},{:.4},{:.4}] θ={:.2}° about [{:.3},{:.3},{:.3}])",
            self.position.x,
            self.position.y,
            self.position.z,
            angle.to_degrees(),
            axis.x,
            axis.y,
            axis.z
        )
    }
}
