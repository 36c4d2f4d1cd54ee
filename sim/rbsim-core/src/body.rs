//! Rigid body description and its Newton-Euler relations.
//!
//! A [`RigidBody`] is immutable apart from its loading callback. Everything
//! that depends on where the body currently is (world-frame inertia, CG
//! offset) is passed in by the caller, usually from a
//! [`BodyDynamics`](crate::BodyDynamics) snapshot.
//!
//! # Conventions
//!
//! - Motion is the twist of the body origin `A`: `(v_A, ω)`.
//! - Momentum is `(p, L_A)` with angular momentum about `A`.
//! - `c` is the world-frame offset from `A` to the centre of mass.
//! - `I_C` / `M_C` are the world-frame inertia about the CG and its inverse.

use std::fmt;
use std::sync::Arc;

use nalgebra::{Matrix3, Quaternion, Vector3};
use rbsim_types::{MatrixExt, Pose, QuaternionExt, Result, SimError, SpatialVector};
use tracing::warn;

use crate::callbacks::LoadingFn;
use crate::geometry::Solid;

/// Physical description of one rigid body.
#[derive(Debug, Clone)]
pub struct RigidBody {
    mass: f64,
    volume: f64,
    cg: Vector3<f64>,
    mmoi: Matrix3<f64>,
    inv_mmoi: Matrix3<f64>,
    initial_pose: Pose,
    initial_motion: SpatialVector,
    loading: Option<LoadingFn>,
    shape: Arc<dyn Solid>,
}

impl RigidBody {
    /// Build a body of `mass` from a solid shape.
    ///
    /// A singular inertia is accepted: the inverse is set to zero and the
    /// body cannot be spun up by any moment.
    #[must_use]
    pub fn new(
        mass: f64,
        shape: impl Solid + 'static,
        initial_pose: Pose,
        initial_motion: SpatialVector,
    ) -> Self {
        Self::from_shared(mass, Arc::new(shape), initial_pose, initial_motion)
    }

    /// Build a body from a shape that is shared with other owners
    /// (a renderer, another body).
    #[must_use]
    pub fn from_shared(
        mass: f64,
        shape: Arc<dyn Solid>,
        initial_pose: Pose,
        initial_motion: SpatialVector,
    ) -> Self {
        let volume = shape.volume();
        let cg = shape.center();
        let mmoi = shape.inertia_about_center(mass);
        let inv_mmoi = invert_inertia(&mmoi);
        if mmoi.is_singular() {
            warn!(mass, volume, "rigid body inertia is singular, rotation disabled");
        }

        Self {
            mass,
            volume,
            cg,
            mmoi,
            inv_mmoi,
            initial_pose,
            initial_motion,
            loading: None,
            shape,
        }
    }

    /// Attach a loading callback.
    #[must_use]
    pub fn with_loading(mut self, loading: LoadingFn) -> Self {
        self.loading = Some(loading);
        self
    }

    /// Mass.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Volume of the shape.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Mass over volume.
    #[must_use]
    pub fn density(&self) -> f64 {
        self.mass / self.volume
    }

    /// Centre of mass in the local frame.
    #[must_use]
    pub fn cg(&self) -> Vector3<f64> {
        self.cg
    }

    /// Local inertia about the centre of mass.
    #[must_use]
    pub fn mmoi(&self) -> Matrix3<f64> {
        self.mmoi
    }

    /// Local inverse inertia (zero when the inertia is singular).
    #[must_use]
    pub fn inv_mmoi(&self) -> Matrix3<f64> {
        self.inv_mmoi
    }

    /// Whether the inertia could not be inverted.
    #[must_use]
    pub fn has_singular_inertia(&self) -> bool {
        self.mmoi.is_singular()
    }

    /// Pose at time zero.
    #[must_use]
    pub fn initial_pose(&self) -> Pose {
        self.initial_pose
    }

    /// Motion (twist of the origin) at time zero.
    #[must_use]
    pub fn initial_motion(&self) -> SpatialVector {
        self.initial_motion
    }

    /// Loading callback, if any.
    #[must_use]
    pub fn loading(&self) -> Option<&LoadingFn> {
        self.loading.as_ref()
    }

    /// Replace the loading callback.
    pub fn set_loading(&mut self, loading: Option<LoadingFn>) {
        self.loading = loading;
    }

    /// Shape the mass properties came from.
    #[must_use]
    pub fn shape(&self) -> &Arc<dyn Solid> {
        &self.shape
    }

    /// World inertia about the CG for a rotation matrix: `R·I·Rᵀ`.
    #[must_use]
    pub fn inertia_matrix(&self, rotation: &Matrix3<f64>) -> Matrix3<f64> {
        self.mmoi.rotated(rotation, false)
    }

    /// World inverse inertia about the CG for a rotation matrix: `R·I⁻¹·Rᵀ`.
    #[must_use]
    pub fn inverse_inertia_matrix(&self, rotation: &Matrix3<f64>) -> Matrix3<f64> {
        self.inv_mmoi.rotated(rotation, false)
    }

    /// Momentum for a motion at the given orientation.
    #[must_use]
    pub fn momentum(&self, orientation: &Quaternion<f64>, motion: &SpatialVector) -> SpatialVector {
        let rotation = orientation.rotation_matrix();
        let i_c = self.inertia_matrix(&rotation);
        let c = orientation.rotate_vector(&self.cg);
        self.momentum_with(motion, &i_c, &c)
    }

    /// `p = m(v + ω×c)`, `L = I_C·ω + c×p`.
    #[must_use]
    pub fn momentum_with(
        &self,
        motion: &SpatialVector,
        i_c: &Matrix3<f64>,
        c: &Vector3<f64>,
    ) -> SpatialVector {
        let v = &motion.translational;
        let w = &motion.rotational;
        let p = (v + w.cross(c)) * self.mass;
        SpatialVector::new(p, i_c * w + c.cross(&p))
    }

    /// Motion for a momentum at the given orientation.
    #[must_use]
    pub fn motion(&self, orientation: &Quaternion<f64>, momentum: &SpatialVector) -> SpatialVector {
        let rotation = orientation.rotation_matrix();
        let m_c = self.inverse_inertia_matrix(&rotation);
        let c = orientation.rotate_vector(&self.cg);
        self.motion_with(momentum, &m_c, &c)
    }

    /// `ω = M_C(L − c×p)`, `v = p/m − ω×c`. Massless bodies do not translate.
    #[must_use]
    pub fn motion_with(
        &self,
        momentum: &SpatialVector,
        m_c: &Matrix3<f64>,
        c: &Vector3<f64>,
    ) -> SpatialVector {
        let p = &momentum.translational;
        let l = &momentum.rotational;
        let w = m_c * (l - c.cross(p));
        let v = if self.mass > 0.0 {
            p / self.mass - w.cross(c)
        } else {
            Vector3::zeros()
        };
        SpatialVector::new(v, w)
    }

    /// Loading needed to produce an acceleration:
    /// `F = m(a + α×c + ω×(ω×c))`, `τ = I_C·α + ω×(I_C·ω) + c×F`.
    #[must_use]
    pub fn net_load(
        &self,
        acceleration: &SpatialVector,
        motion: &SpatialVector,
        i_c: &Matrix3<f64>,
        c: &Vector3<f64>,
    ) -> SpatialVector {
        let a = &acceleration.translational;
        let alpha = &acceleration.rotational;
        let w = &motion.rotational;
        let f = (a + alpha.cross(c) + w.cross(&w.cross(c))) * self.mass;
        let tau = i_c * alpha + w.cross(&(i_c * w)) + c.cross(&f);
        SpatialVector::new(f, tau)
    }

    /// Acceleration produced by a loading:
    /// `α = M_C(τ − c×F − ω×(I_C·ω))`, `a = F/m − α×c − ω×(ω×c)`.
    #[must_use]
    pub fn acceleration(
        &self,
        load: &SpatialVector,
        motion: &SpatialVector,
        m_c: &Matrix3<f64>,
        i_c: &Matrix3<f64>,
        c: &Vector3<f64>,
    ) -> SpatialVector {
        let f = &load.translational;
        let tau = &load.rotational;
        let w = &motion.rotational;
        let alpha = m_c * (tau - c.cross(f) - w.cross(&(i_c * w)));
        let a = if self.mass > 0.0 {
            f / self.mass - alpha.cross(c) - w.cross(&w.cross(c))
        } else {
            Vector3::zeros()
        };
        SpatialVector::new(a, alpha)
    }

    /// Acceleration from a loading when momentum is the known quantity:
    /// `G = F − ω×p`, `α = M_C(τ − ω×L − v×p − c×G)`, `a = G/m − α×c − v×ω`.
    #[must_use]
    pub fn acceleration_from_momentum(
        &self,
        load: &SpatialVector,
        momentum: &SpatialVector,
        m_c: &Matrix3<f64>,
        c: &Vector3<f64>,
    ) -> SpatialVector {
        let motion = self.motion_with(momentum, m_c, c);
        let v = &motion.translational;
        let w = &motion.rotational;
        let p = &momentum.translational;
        let l = &momentum.rotational;

        let g = load.translational - w.cross(p);
        let alpha = m_c * (load.rotational - w.cross(l) - v.cross(p) - c.cross(&g));
        let a = if self.mass > 0.0 {
            g / self.mass - alpha.cross(c) - v.cross(w)
        } else {
            Vector3::zeros()
        };
        SpatialVector::new(a, alpha)
    }

    /// Check that the mass properties are physical.
    pub fn validate(&self) -> Result<()> {
        if !self.mass.is_finite() {
            return Err(SimError::invalid_mass("mass must be finite"));
        }

        if self.mass < 0.0 {
            return Err(SimError::invalid_mass("mass cannot be negative"));
        }

        if !self.cg.iter().all(|x| x.is_finite()) {
            return Err(SimError::invalid_mass("center of mass must be finite"));
        }

        if !self.mmoi.all_finite() {
            return Err(SimError::invalid_mass("inertia tensor must be finite"));
        }

        let asymmetry = (self.mmoi - self.mmoi.transpose()).amax();
        if asymmetry > 1e-10 * (1.0 + self.mmoi.amax()) {
            return Err(SimError::invalid_mass("inertia tensor must be symmetric"));
        }

        let eigenvalues = self.mmoi.symmetric_eigenvalues();
        if eigenvalues.iter().any(|&e| e < -1e-10) {
            return Err(SimError::invalid_mass(
                "inertia tensor must be positive semi-definite",
            ));
        }

        Ok(())
    }
}

/// Invert a body inertia, or zero when it is singular.
///
/// Diagonal tensors (spheres, aligned boxes) are inverted entry by entry.
#[allow(clippy::float_cmp)]
fn invert_inertia(mmoi: &Matrix3<f64>) -> Matrix3<f64> {
    if mmoi.is_singular() {
        return Matrix3::zeros();
    }
    let off_diagonal = [
        mmoi[(0, 1)],
        mmoi[(0, 2)],
        mmoi[(1, 0)],
        mmoi[(1, 2)],
        mmoi[(2, 0)],
        mmoi[(2, 1)],
    ];
    if off_diagonal.iter().all(|&x| x == 0.0) {
        Matrix3::from_diagonal(&mmoi.diagonal().map(|d| 1.0 / d))
    } else {
        mmoi.cofactor_inverse()
    }
}

impl fmt::Display for RigidBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pose = &self.initial_pose;
        let motion = &self.initial_motion;
        write!(
            f,
            "RigidBody(m={:.4} V={:.4} cg=[{:.4},{:.4},{:.4}] r=[{:.3},{:.3},{:.3}] v={:.3} ω={:.3})",
            self.mass,
            self.volume,
            self.cg.x,
            self.cg.y,
            self.cg.z,
            pose.position.x,
            pose.position.y,
            pose.position.z,
            motion.translational.norm(),
            motion.rotational.norm()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::geometry::{Polyhedron, Sphere};
    use approx::assert_relative_eq;
    use rbsim_types::algebra::{quaternion_from_axis_angle, symmetric};

    fn pyramid_body() -> RigidBody {
        RigidBody::new(
            0.08,
            Polyhedron::pyramid(1.5, 2.0),
            Pose::new(
                Vector3::new(1.0, 0.0, -1.0),
                quaternion_from_axis_angle(&Vector3::new(1.0, 1.0, 0.0), 0.6),
            ),
            SpatialVector::new(Vector3::new(0.2, -0.1, 0.0), Vector3::new(0.5, 1.0, -0.3)),
        )
    }

    #[test]
    fn test_sphere_body() {
        let body = RigidBody::new(
            2.0,
            Sphere::new(Vector3::new(0.0, 0.0, 1.0), 0.5),
            Pose::identity(),
            SpatialVector::zero(),
        );
        let i0 = 2.0 * 2.0 * 0.25 / 5.0;
        assert_relative_eq!(body.mmoi(), Matrix3::from_diagonal_element(i0));
        assert_eq!(body.inv_mmoi(), Matrix3::from_diagonal_element(1.0 / i0));
        assert_eq!(body.cg(), Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(body.density(), 2.0 / body.volume());
        assert!(!body.has_singular_inertia());
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_singular_inertia_gives_zero_inverse() {
        let body = RigidBody::new(0.0, Sphere::centered(1.0), Pose::identity(), SpatialVector::zero());
        assert!(body.has_singular_inertia());
        assert_eq!(body.inv_mmoi(), Matrix3::zeros());
    }

    #[test]
    fn test_general_inverse() {
        let m = symmetric(2.0, 3.0, 4.0, 0.1, -0.2, 0.3);
        assert_relative_eq!(invert_inertia(&m) * m, Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_motion_momentum_round_trip() {
        let body = pyramid_body();
        let q = body.initial_pose().orientation;
        let motion = body.initial_motion();
        let momentum = body.momentum(&q, &motion);
        let back = body.motion(&q, &momentum);
        assert_relative_eq!(back.translational, motion.translational, epsilon = 1e-10);
        assert_relative_eq!(back.rotational, motion.rotational, epsilon = 1e-10);
    }

    #[test]
    fn test_net_load_acceleration_round_trip() {
        let body = pyramid_body();
        let q = body.initial_pose().orientation;
        let r = q.rotation_matrix();
        let i_c = body.inertia_matrix(&r);
        let m_c = body.inverse_inertia_matrix(&r);
        let c = q.rotate_vector(&body.cg());
        let motion = body.initial_motion();

        let accel = SpatialVector::new(Vector3::new(1.0, 0.0, -2.0), Vector3::new(0.0, 3.0, 0.5));
        let load = body.net_load(&accel, &motion, &i_c, &c);
        let back = body.acceleration(&load, &motion, &m_c, &i_c, &c);
        assert_relative_eq!(back.translational, accel.translational, epsilon = 1e-9);
        assert_relative_eq!(back.rotational, accel.rotational, epsilon = 1e-9);
    }

    #[test]
    fn test_acceleration_from_momentum_at_rest() {
        let body = RigidBody::new(
            3.0,
            Polyhedron::cuboid(1.0, 2.0, 3.0),
            Pose::identity(),
            SpatialVector::zero(),
        );
        let m_c = body.inv_mmoi();
        let load = SpatialVector::new(Vector3::new(6.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let accel =
            body.acceleration_from_momentum(&load, &SpatialVector::zero(), &m_c, &Vector3::zeros());
        assert_relative_eq!(accel.translational, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(accel.rotational, m_c * load.rotational, epsilon = 1e-12);
    }

    #[test]
    fn test_massless_body_does_not_translate() {
        let body = RigidBody::new(0.0, Sphere::centered(1.0), Pose::identity(), SpatialVector::zero());
        let momentum = SpatialVector::pure_twist(&Vector3::new(1.0, 0.0, 0.0));
        let motion = body.motion(&Quaternion::identity(), &momentum);
        assert_eq!(motion, SpatialVector::zero());
    }

    #[test]
    fn test_validate_rejects_bad_mass() {
        let body = RigidBody::new(-1.0, Sphere::centered(1.0), Pose::identity(), SpatialVector::zero());
        assert!(body.validate().is_err());

        let body = RigidBody::new(
            f64::NAN,
            Sphere::centered(1.0),
            Pose::identity(),
            SpatialVector::zero(),
        );
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_loading_setter_and_display() {
        let mut body = pyramid_body();
        assert!(body.loading().is_none());
        body.set_loading(Some(LoadingFn::new(|_, _, _| SpatialVector::zero())));
        assert!(body.loading().is_some());
        assert!(body.to_string().starts_with("RigidBody(m=0.0800"));
        assert!(body.shape().volume() > 0.0);
    }
}
