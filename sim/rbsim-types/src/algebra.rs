//! Vector, matrix and quaternion kernel.
//!
//! The dynamics layer needs a handful of operators that `nalgebra` does not
//! spell out directly: the skew (cross product) operator, the point-mass
//! inertia operator, tolerance equality against a fixed absolute threshold,
//! and quaternion rotation for quaternions that are not (yet) unit length.
//! They live here as free functions and extension traits on the `nalgebra`
//! types, so the rest of the workspace keeps using `Vector3<f64>`,
//! `Matrix3<f64>` and `Quaternion<f64>` directly.
//!
//! # Tolerances
//!
//! | Constant | Value | Use |
//! |----------|-------|-----|
//! | [`ULP`]   | 2⁻⁵¹ | unit in the last place near 1.0 |
//! | [`TINY`]  | 64·ULP | near-zero and near-unit tests |
//! | [`SMALL`] | 2048·ULP | coarse geometric proximity |

use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix3, Quaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Result, SimError};

/// Unit in the last place for values near one (2⁻⁵¹).
pub const ULP: f64 = 1.0 / 2_251_799_813_685_248.0;

/// Threshold for near-zero and tolerance-equality tests.
pub const TINY: f64 = 64.0 * ULP;

/// Threshold for coarse geometric proximity (node merging).
pub const SMALL: f64 = 2048.0 * ULP;

/// A principal coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// All three axes in order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Unit vector along this axis.
    #[must_use]
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
        }
    }

    /// Component index of this axis (0, 1 or 2).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Axis for a component index.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NotSupported`] for indices above 2.
    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| SimError::not_supported(format!("axis index {index}")))
    }
}

impl FromStr for Axis {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "x" | "X" => Ok(Self::X),
            "y" | "Y" => Ok(Self::Y),
            "z" | "Z" => Ok(Self::Z),
            other => Err(SimError::not_supported(format!("axis {other:?}"))),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Skew-symmetric cross product operator: `cross_op(a) * b == a × b`.
#[must_use]
pub fn cross_op(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y, //
        v.z, 0.0, -v.x, //
        -v.y, v.x, 0.0,
    )
}

/// Inertia of a point mass `scale` located at `v`, i.e. `-scale·[v]×[v]×`.
///
/// Every product is pre-multiplied by `scale` before it is placed.
#[must_use]
pub fn mmoi(v: &Vector3<f64>, scale: f64) -> Matrix3<f64> {
    let xx = scale * v.x * v.x;
    let yy = scale * v.y * v.y;
    let zz = scale * v.z * v.z;
    let xy = scale * v.x * v.y;
    let yz = scale * v.y * v.z;
    let zx = scale * v.z * v.x;
    Matrix3::new(
        yy + zz, -xy, -zx, //
        -xy, xx + zz, -yz, //
        -zx, -yz, xx + yy,
    )
}

/// Outer product `a·bᵀ`.
#[must_use]
pub fn outer(a: &Vector3<f64>, b: &Vector3<f64>) -> Matrix3<f64> {
    a * b.transpose()
}

/// Symmetric matrix from its diagonal and upper off-diagonal entries.
#[must_use]
pub fn symmetric(a11: f64, a22: f64, a33: f64, a12: f64, a23: f64, a13: f64) -> Matrix3<f64> {
    Matrix3::new(
        a11, a12, a13, //
        a12, a22, a23, //
        a13, a23, a33,
    )
}

/// Rotation matrix about an arbitrary axis (normalized internally).
#[must_use]
pub fn rotation_about(axis: &Vector3<f64>, angle: f64) -> Matrix3<f64> {
    let k = axis.unit_or_self();
    Matrix3::identity() + cross_op(&k) * angle.sin() - mmoi(&k, 1.0 - angle.cos())
}

/// Rotation matrix about a principal axis.
#[must_use]
pub fn rotation_about_axis(axis: Axis, angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    match axis {
        Axis::X => Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c),
        Axis::Y => Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c),
        Axis::Z => Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0),
    }
}

/// Pure (zero scalar) quaternion holding `v` in its vector part.
#[must_use]
pub fn pure_quaternion(v: &Vector3<f64>) -> Quaternion<f64> {
    Quaternion::from_imag(*v)
}

/// Quaternion for a rotation of `angle` about `axis` (normalized internally).
#[must_use]
pub fn quaternion_from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Quaternion<f64> {
    let (s, c) = (angle / 2.0).sin_cos();
    Quaternion::from_parts(c, axis.unit_or_self() * s)
}

/// Quaternion for a rotation of `angle` about a principal axis.
#[must_use]
pub fn quaternion_about_axis(axis: Axis, angle: f64) -> Quaternion<f64> {
    quaternion_from_axis_angle(&axis.unit(), angle)
}

/// Unit quaternion for a proper rotation matrix.
///
/// Uses the trace branch when the trace is positive and otherwise
/// extracts from the largest diagonal element, so identity and half-turn
/// rotations are handled.
#[must_use]
pub fn quaternion_from_rotation(m: &Matrix3<f64>) -> Quaternion<f64> {
    let x = m[(2, 1)] - m[(1, 2)];
    let y = m[(0, 2)] - m[(2, 0)];
    let z = m[(1, 0)] - m[(0, 1)];
    let t = m.trace();

    if t > 0.0 {
        let s = 0.5 * (1.0 + t).sqrt();
        let f = 0.25 / s;
        return Quaternion::new(s, f * x, f * y, f * z);
    }

    let (a11, a22, a33) = (m[(0, 0)], m[(1, 1)], m[(2, 2)]);
    if a11 >= a22 && a11 >= a33 {
        let r = (1.0 + a11 - a22 - a33).sqrt();
        let f = 0.5 / r;
        Quaternion::new(
            x * f,
            0.5 * r,
            (m[(0, 1)] + m[(1, 0)]) * f,
            (m[(0, 2)] + m[(2, 0)]) * f,
        )
    } else if a22 >= a33 {
        let r = (1.0 - a11 + a22 - a33).sqrt();
        let f = 0.5 / r;
        Quaternion::new(
            y * f,
            (m[(0, 1)] + m[(1, 0)]) * f,
            0.5 * r,
            (m[(1, 2)] + m[(2, 1)]) * f,
        )
    } else {
        let r = (1.0 - a11 - a22 + a33).sqrt();
        let f = 0.5 / r;
        Quaternion::new(
            z * f,
            (m[(0, 2)] + m[(2, 0)]) * f,
            (m[(1, 2)] + m[(2, 1)]) * f,
            0.5 * r,
        )
    }
}

/// Shortest rotation taking the direction of `from` onto the direction of `to`.
///
/// Parallel vectors give the identity. Opposite vectors give a half turn
/// about an axis perpendicular to `from`.
#[must_use]
pub fn quaternion_between(from: &Vector3<f64>, to: &Vector3<f64>) -> Quaternion<f64> {
    let n = from.cross(to);
    let nm = n.norm();
    if nm < TINY {
        if from.dot(to) >= 0.0 {
            return Quaternion::identity();
        }
        let helper = if from.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        return Quaternion::from_imag(from.cross(&helper).unit_or_self());
    }
    let m = (from.norm_squared() * to.norm_squared()).sqrt();
    let a = (from.dot(to) / m).clamp(-1.0, 1.0);
    let sin = ((1.0 - a) / 2.0).sqrt();
    let cos = ((1.0 + a) / 2.0).sqrt();
    Quaternion::from_parts(cos, n / nm * sin)
}

/// Tolerance helpers for `Vector3<f64>`.
pub trait VectorExt {
    /// Component-wise absolute difference below [`TINY`].
    fn approx_eq(&self, other: &Self) -> bool;
    /// Every component is below [`TINY`] in magnitude.
    fn near_zero(&self) -> bool;
    /// No component is `NaN` or infinite.
    fn all_finite(&self) -> bool;
    /// Unit vector in the same direction, or `self` unchanged when its
    /// squared magnitude is not above `TINY²`.
    #[must_use]
    fn unit_or_self(&self) -> Self;
    /// Rotate about an arbitrary axis (Rodrigues).
    #[must_use]
    fn rotate_about(&self, axis: &Vector3<f64>, angle: f64) -> Self;
    /// Rotate about a principal axis.
    #[must_use]
    fn rotate_about_axis(&self, axis: Axis, angle: f64) -> Self;
    /// Unsigned angle to another vector in `[0, π]`.
    fn angle_between(&self, other: &Self) -> f64;
}

impl VectorExt for Vector3<f64> {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).iter().all(|d| d.abs() < TINY)
    }

    fn near_zero(&self) -> bool {
        self.iter().all(|c| c.abs() < TINY)
    }

    fn all_finite(&self) -> bool {
        self.iter().all(|c| c.is_finite())
    }

    fn unit_or_self(&self) -> Self {
        let m2 = self.norm_squared();
        if m2 > TINY * TINY {
            self / m2.sqrt()
        } else {
            *self
        }
    }

    fn rotate_about(&self, axis: &Vector3<f64>, angle: f64) -> Self {
        let k = axis.unit_or_self();
        let kxp = k.cross(self);
        let kxkxp = k.cross(&kxp);
        self + kxp * angle.sin() + kxkxp * (1.0 - angle.cos())
    }

    fn rotate_about_axis(&self, axis: Axis, angle: f64) -> Self {
        rotation_about_axis(axis, angle) * self
    }

    fn angle_between(&self, other: &Self) -> f64 {
        self.cross(other).norm().atan2(self.dot(other))
    }
}

/// Determinant, inverse and tolerance helpers for `Matrix3<f64>`.
pub trait MatrixExt {
    /// Determinant by cofactor expansion along the first row.
    fn cofactor_determinant(&self) -> f64;
    /// Inverse from the adjugate, scaled by `1/det` unconditionally.
    ///
    /// Check [`is_singular`](Self::is_singular) first: a singular matrix
    /// produces non-finite entries.
    #[must_use]
    fn cofactor_inverse(&self) -> Self;
    /// The cofactor determinant is exactly zero.
    fn is_singular(&self) -> bool;
    /// Every entry is below [`TINY`] in magnitude.
    fn near_zero(&self) -> bool;
    /// Entry-wise absolute difference below [`TINY`].
    fn approx_eq(&self, other: &Self) -> bool;
    /// No entry is `NaN` or infinite.
    fn all_finite(&self) -> bool;
    /// `R·self·Rᵀ` (or `Rᵀ·self·R` with `inverse`), the similarity transform
    /// that re-expresses a tensor in a rotated frame.
    #[must_use]
    fn rotated(&self, rotation: &Matrix3<f64>, inverse: bool) -> Self;
}

impl MatrixExt for Matrix3<f64> {
    fn cofactor_determinant(&self) -> f64 {
        let m = self;
        m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
            + m[(0, 1)] * (m[(1, 2)] * m[(2, 0)] - m[(1, 0)] * m[(2, 2)])
            + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
    }

    fn cofactor_inverse(&self) -> Self {
        let m = self;
        let d = 1.0 / self.cofactor_determinant();
        Matrix3::new(
            d * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)]),
            d * (m[(0, 2)] * m[(2, 1)] - m[(0, 1)] * m[(2, 2)]),
            d * (m[(0, 1)] * m[(1, 2)] - m[(0, 2)] * m[(1, 1)]),
            d * (m[(1, 2)] * m[(2, 0)] - m[(1, 0)] * m[(2, 2)]),
            d * (m[(0, 0)] * m[(2, 2)] - m[(0, 2)] * m[(2, 0)]),
            d * (m[(0, 2)] * m[(1, 0)] - m[(0, 0)] * m[(1, 2)]),
            d * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)]),
            d * (m[(0, 1)] * m[(2, 0)] - m[(0, 0)] * m[(2, 1)]),
            d * (m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)]),
        )
    }

    #[allow(clippy::float_cmp)] // exact zero is the contract
    fn is_singular(&self) -> bool {
        self.cofactor_determinant() == 0.0
    }

    fn near_zero(&self) -> bool {
        self.iter().all(|c| c.abs() < TINY)
    }

    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).iter().all(|d| d.abs() < TINY)
    }

    fn all_finite(&self) -> bool {
        self.iter().all(|c| c.is_finite())
    }

    fn rotated(&self, rotation: &Matrix3<f64>, inverse: bool) -> Self {
        if inverse {
            rotation.transpose() * self * rotation
        } else {
            rotation * self * rotation.transpose()
        }
    }
}

/// Rotation and normalization helpers for `Quaternion<f64>`.
///
/// The vector part is `imag()` and the scalar part is `w`. None of these
/// require a unit quaternion; rotations of a non-unit quaternion are scaled
/// accordingly, which is why the integrator renormalizes after every stage.
pub trait QuaternionExt {
    /// Rotate a vector: `v + 2(s·(u×v) + u×(u×v))`.
    fn rotate_vector(&self, v: &Vector3<f64>) -> Vector3<f64>;
    /// Rotate a vector by the inverse rotation (sign of `s` flipped).
    fn rotate_vector_inverse(&self, v: &Vector3<f64>) -> Vector3<f64>;
    /// Rotation matrix `I + 2(s·[u]× − mmoi(u))`.
    fn rotation_matrix(&self) -> Matrix3<f64>;
    /// Transpose rotation matrix `I + 2(−s·[u]× − mmoi(u))`.
    fn inverse_rotation_matrix(&self) -> Matrix3<f64>;
    /// Rotation axis and angle; `(0, 0)` when the vector part is negligible.
    fn to_axis_angle(&self) -> (Vector3<f64>, f64);
    /// Rescale to unit length when the squared norm is positive and not one.
    #[must_use]
    fn unit_or_self(&self) -> Self;
    /// Multiplicative inverse `conj(q) / |q|²`.
    #[must_use]
    fn reciprocal(&self) -> Self;
    /// Component-wise absolute difference below [`TINY`].
    fn approx_eq(&self, other: &Self) -> bool;
    /// No component is `NaN` or infinite.
    fn all_finite(&self) -> bool;
}

impl QuaternionExt for Quaternion<f64> {
    fn rotate_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let u = self.imag();
        let uxv = u.cross(v);
        v + 2.0 * (self.w * uxv + u.cross(&uxv))
    }

    fn rotate_vector_inverse(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let u = self.imag();
        let uxv = u.cross(v);
        v + 2.0 * (-self.w * uxv + u.cross(&uxv))
    }

    fn rotation_matrix(&self) -> Matrix3<f64> {
        let u = self.imag();
        Matrix3::identity() + 2.0 * (self.w * cross_op(&u) - mmoi(&u, 1.0))
    }

    fn inverse_rotation_matrix(&self) -> Matrix3<f64> {
        let u = self.imag();
        Matrix3::identity() + 2.0 * (-self.w * cross_op(&u) - mmoi(&u, 1.0))
    }

    fn to_axis_angle(&self) -> (Vector3<f64>, f64) {
        let u = self.imag();
        let um = u.norm();
        if um < TINY {
            return (Vector3::zeros(), 0.0);
        }
        let sin = 2.0 * self.w * um;
        let cos = self.w * self.w - um * um;
        (u / um, sin.atan2(cos))
    }

    #[allow(clippy::float_cmp)] // exactly-unit quaternions are left untouched
    fn unit_or_self(&self) -> Self {
        let m2 = self.norm_squared();
        if m2 > 0.0 && m2 != 1.0 {
            *self * (1.0 / m2.sqrt())
        } else {
            *self
        }
    }

    fn reciprocal(&self) -> Self {
        self.conjugate() * (1.0 / self.norm_squared())
    }

    fn approx_eq(&self, other: &Self) -> bool {
        (self.coords - other.coords).iter().all(|d| d.abs() < TINY)
    }

    fn all_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }
}
