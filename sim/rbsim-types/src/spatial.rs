//! Six-component spatial vectors.
//!
//! A [`SpatialVector`] pairs a translational and a rotational 3-vector. The
//! same type carries both kinds of screw quantity:
//!
//! | Use | `translational` | `rotational` |
//! |-----|-----------------|--------------|
//! | twist (motion) | linear velocity of the reference point | angular velocity |
//! | wrench (loading) | force | moment about the reference point |
//! | momentum | linear momentum | angular momentum about the reference point |
//!
//! Which one a value is depends on the call site, so the constructors are
//! named after the quantity they build.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::algebra::VectorExt;
use crate::{Result, SimError};

/// Where the line-of-action information of a spatial vector is stored.
///
/// Twists are *axis* quantities (the rotational part is the free vector);
/// wrenches and momenta are *ray* quantities (the translational part is the
/// free vector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Coordinates {
    /// Axis coordinates (twists).
    Axis,
    /// Ray coordinates (wrenches, momenta).
    Ray,
}

impl FromStr for Coordinates {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "axis" => Ok(Self::Axis),
            "ray" => Ok(Self::Ray),
            other => Err(SimError::not_supported(format!(
                "spatial coordinates {other:?}"
            ))),
        }
    }
}

/// A translational/rotational pair of 3-vectors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpatialVector {
    /// Linear velocity, force or linear momentum.
    pub translational: Vector3<f64>,
    /// Angular velocity, moment or angular momentum.
    pub rotational: Vector3<f64>,
}

impl SpatialVector {
    /// Create from both parts.
    #[must_use]
    pub fn new(translational: Vector3<f64>, rotational: Vector3<f64>) -> Self {
        Self {
            translational,
            rotational,
        }
    }

    /// All zeros.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Twist of a rotation `omega` about an axis through `position` with the
    /// given screw `pitch`: `(r×ω + pitch·ω, ω)`.
    #[must_use]
    pub fn twist_at(omega: &Vector3<f64>, position: &Vector3<f64>, pitch: f64) -> Self {
        Self::new(position.cross(omega) + omega * pitch, *omega)
    }

    /// Twist of a rotation `omega` through `position` plus a parallel
    /// velocity: `(r×ω + v, ω)`.
    #[must_use]
    pub fn twist_at_with_moment(
        omega: &Vector3<f64>,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> Self {
        Self::new(position.cross(omega) + velocity, *omega)
    }

    /// Pure translation: `(v, 0)`.
    #[must_use]
    pub fn pure_twist(velocity: &Vector3<f64>) -> Self {
        Self::new(*velocity, Vector3::zeros())
    }

    /// Wrench of a force acting along a line through `position` with the
    /// given screw `pitch`: `(F, r×F + pitch·F)`.
    #[must_use]
    pub fn wrench_at(force: &Vector3<f64>, position: &Vector3<f64>, pitch: f64) -> Self {
        Self::new(*force, position.cross(force) + force * pitch)
    }

    /// Wrench of a force through `position` plus a free moment:
    /// `(F, r×F + M)`.
    #[must_use]
    pub fn wrench_at_with_moment(
        force: &Vector3<f64>,
        position: &Vector3<f64>,
        moment: &Vector3<f64>,
    ) -> Self {
        Self::new(*force, position.cross(force) + moment)
    }

    /// Pure couple: `(0, M)`.
    #[must_use]
    pub fn pure_wrench(moment: &Vector3<f64>) -> Self {
        Self::new(Vector3::zeros(), *moment)
    }

    /// `self + other * factor`.
    #[must_use]
    pub fn add_scaled(&self, other: &Self, factor: f64) -> Self {
        Self::new(
            self.translational + other.translational * factor,
            self.rotational + other.rotational * factor,
        )
    }

    /// Reciprocal product: `traA·traB + rotA·rotB`.
    ///
    /// For a twist and a wrench about the same point this is the power.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.translational.dot(&other.translational) + self.rotational.dot(&other.rotational)
    }

    /// Spatial cross product of `a` and `b` in the given coordinate
    /// conventions.
    ///
    /// - Axis×Axis → `(rotA×traB + traA×rotB, rotA×rotB)`
    /// - Axis×Ray  → `(rotA×traB, traA×traB + rotA×rotB)`
    /// - Ray×Axis  → `(traA×rotB, traA×traB + rotA×rotB)`
    /// - Ray×Ray   → `(rotA×traB + traA×rotB, traA×traB)`
    #[must_use]
    pub fn cross(a: &Self, b: &Self, a_coords: Coordinates, b_coords: Coordinates) -> Self {
        let (ta, ra) = (&a.translational, &a.rotational);
        let (tb, rb) = (&b.translational, &b.rotational);
        match (a_coords, b_coords) {
            (Coordinates::Axis, Coordinates::Axis) => {
                Self::new(ra.cross(tb) + ta.cross(rb), ra.cross(rb))
            }
            (Coordinates::Axis, Coordinates::Ray) => {
                Self::new(ra.cross(tb), ta.cross(tb) + ra.cross(rb))
            }
            (Coordinates::Ray, Coordinates::Axis) => {
                Self::new(ta.cross(rb), ta.cross(tb) + ra.cross(rb))
            }
            (Coordinates::Ray, Coordinates::Ray) => {
                Self::new(ra.cross(tb) + ta.cross(rb), ta.cross(tb))
            }
        }
    }

    /// Both parts tolerance-equal.
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.translational.approx_eq(&other.translational)
            && self.rotational.approx_eq(&other.rotational)
    }

    /// No component is `NaN` or infinite.
    #[must_use]
    pub fn all_finite(&self) -> bool {
        self.translational.all_finite() && self.rotational.all_finite()
    }
}

impl Add for SpatialVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.translational + rhs.translational,
            self.rotational + rhs.rotational,
        )
    }
}

impl AddAssign for SpatialVector {
    fn add_assign(&mut self, rhs: Self) {
        self.translational += rhs.translational;
        self.rotational += rhs.rotational;
    }
}

impl Sub for SpatialVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.translational - rhs.translational,
            self.rotational - rhs.rotational,
        )
    }
}

impl SubAssign for SpatialVector {
    fn sub_assign(&mut self, rhs: Self) {
        self.translational -= rhs.translational;
        self.rotational -= rhs.rotational;
    }
}

impl Neg for SpatialVector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.translational, -self.rotational)
    }
}

impl Mul<f64> for SpatialVector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.translational * rhs, self.rotational * rhs)
    }
}

impl Mul<SpatialVector> for f64 {
    type Output = SpatialVector;

    fn mul(self, rhs: SpatialVector) -> SpatialVector {
        rhs * self
    }
}

impl Div<f64> for SpatialVector {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.translational / rhs, self.rotational / rhs)
    }
}

impl fmt::Display for SpatialVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.translational;
        let r = &self.rotational;
        write!(
            f,
            "[{:.6},{:.6},{:.6}|{:.6},{:.6},{:.6}]",
            t.x, t.y, t.z, r.x, r.y, r.z
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn a() -> SpatialVector {
        SpatialVector::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(-0.5, 0.25, 2.0))
    }

    fn b() -> SpatialVector {
        SpatialVector::new(Vector3::new(0.0, -1.0, 4.0), Vector3::new(3.0, 1.0, -1.0))
    }

    #[test]
    fn test_wrench_at() {
        let f = Vector3::new(0.0, 0.0, -10.0);
        let r = Vector3::new(1.0, 0.0, 0.0);
        let w = SpatialVector::wrench_at(&f, &r, 0.0);
        assert_eq!(w.translational, f);
        assert_relative_eq!(w.rotational, Vector3::new(0.0, 10.0, 0.0));

        let w = SpatialVector::wrench_at(&f, &Vector3::zeros(), 0.5);
        assert_relative_eq!(w.rotational, f * 0.5);

        let m = Vector3::new(1.0, 1.0, 1.0);
        let w = SpatialVector::wrench_at_with_moment(&f, &r, &m);
        assert_relative_eq!(w.rotational, r.cross(&f) + m);

        let w = SpatialVector::pure_wrench(&m);
        assert_eq!(w.translational, Vector3::zeros());
        assert_eq!(w.rotational, m);
    }

    #[test]
    fn test_twist_at() {
        let omega = Vector3::new(0.0, 0.0, 2.0);
        let r = Vector3::new(1.0, 0.0, 0.0);
        let t = SpatialVector::twist_at(&omega, &r, 0.0);
        assert_eq!(t.rotational, omega);
        assert_relative_eq!(t.translational, Vector3::new(0.0, -2.0, 0.0));

        let v = Vector3::new(0.0, 0.0, 1.0);
        let t = SpatialVector::twist_at_with_moment(&omega, &r, &v);
        assert_relative_eq!(t.translational, Vector3::new(0.0, -2.0, 1.0));

        let t = SpatialVector::pure_twist(&v);
        assert_eq!(t.translational, v);
        assert_eq!(t.rotational, Vector3::zeros());
    }

    #[test]
    fn test_wrench_transport() {
        let f = Vector3::new(1.0, -2.0, 0.5);
        let r1 = Vector3::new(0.3, 0.1, -2.0);
        let r2 = Vector3::new(-1.0, 4.0, 0.0);
        let w1 = SpatialVector::wrench_at(&f, &r1, 0.0);
        let w2 = SpatialVector::wrench_at(&f, &r2, 0.0);
        let diff = w2 - w1;
        assert_relative_eq!(diff.translational, Vector3::zeros());
        assert_relative_eq!(diff.rotational, (r2 - r1).cross(&f), epsilon = 1e-12);
    }

    #[test]
    fn test_cross_axis_axis() {
        let c = SpatialVector::cross(&a(), &b(), Coordinates::Axis, Coordinates::Axis);
        let (ta, ra, tb, rb) = (a().translational, a().rotational, b().translational, b().rotational);
        assert_relative_eq!(c.translational, ra.cross(&tb) + ta.cross(&rb));
        assert_relative_eq!(c.rotational, ra.cross(&rb));
    }

    #[test]
    fn test_cross_axis_ray() {
        let c = SpatialVector::cross(&a(), &b(), Coordinates::Axis, Coordinates::Ray);
        let (ta, ra, tb, rb) = (a().translational, a().rotational, b().translational, b().rotational);
        assert_relative_eq!(c.translational, ra.cross(&tb));
        assert_relative_eq!(c.rotational, ta.cross(&tb) + ra.cross(&rb));
    }

    #[test]
    fn test_cross_ray_axis() {
        let c = SpatialVector::cross(&a(), &b(), Coordinates::Ray, Coordinates::Axis);
        let (ta, ra, tb, rb) = (a().translational, a().rotational, b().translational, b().rotational);
        assert_relative_eq!(c.translational, ta.cross(&rb));
        assert_relative_eq!(c.rotational, ta.cross(&tb) + ra.cross(&rb));
    }

    #[test]
    fn test_cross_ray_ray() {
        let c = SpatialVector::cross(&a(), &b(), Coordinates::Ray, Coordinates::Ray);
        let (ta, ra, tb, rb) = (a().translational, a().rotational, b().translational, b().rotational);
        assert_relative_eq!(c.translational, ra.cross(&tb) + ta.cross(&rb));
        assert_relative_eq!(c.rotational, ta.cross(&tb));
    }

    #[test]
    fn test_coordinates_parse() {
        assert_eq!("Axis".parse::<Coordinates>().unwrap(), Coordinates::Axis);
        assert_eq!("ray".parse::<Coordinates>().unwrap(), Coordinates::Ray);
        assert!("screw".parse::<Coordinates>().unwrap_err().is_not_supported());
    }

    #[test]
    fn test_arithmetic() {
        let s = a() + b() - b();
        assert!(s.approx_eq(&a()));
        assert!((a() * 2.0).approx_eq(&(2.0 * a())));
        assert!((a() * 2.0 / 2.0).approx_eq(&a()));
        assert!((-a() + a()).approx_eq(&SpatialVector::zero()));
        assert!(a().add_scaled(&b(), 0.5).approx_eq(&(a() + b() * 0.5)));

        let mut acc = SpatialVector::zero();
        acc += a();
        acc -= b();
        assert!(acc.approx_eq(&(a() - b())));

        assert_relative_eq!(a().dot(&b()), -2.0 + 12.0 - 1.5 + 0.25 - 2.0);
    }

    #[test]
    fn test_finite_and_display() {
        assert!(a().all_finite());
        let bad = SpatialVector::pure_twist(&Vector3::new(f64::NAN, 0.0, 0.0));
        assert!(!bad.all_finite());
        let text = SpatialVector::zero().to_string();
        assert!(text.starts_with('[') && text.contains('|'));
    }
}
