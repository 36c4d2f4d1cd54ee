//! Per-step dynamics snapshot and forward/inverse solvers.
//!
//! [`BodyDynamics`] caches everything that depends on a body's current state:
//! rotation matrix, world-frame inertia and its inverse, world CG offset, and
//! the motion recovered from momentum. It is cheap to build and is rebuilt at
//! every Runge-Kutta stage.
//!
//! The solvers cover the four combinations of known/unknown quantities:
//!
//! | Solver | Known | Unknown |
//! |--------|-------|---------|
//! | [`solve_for_acceleration`](BodyDynamics::solve_for_acceleration) | `F`, `τ` | `a`, `α` |
//! | [`solve_for_loading`](BodyDynamics::solve_for_loading) | `a`, `α` | `F`, `τ` |
//! | [`solve_for_pin`](BodyDynamics::solve_for_pin) | `a`, `τ` | `α`, `F` |
//! | [`solve_for_slider`](BodyDynamics::solve_for_slider) | `α`, `F` | `a`, `τ` |
//!
//! Each returns `None` when the body is too degenerate to answer (zero mass,
//! singular inertia). Callers that want the zero result use
//! `unwrap_or_default()`.

use nalgebra::{Matrix3, Vector3};
use rbsim_types::algebra::{mmoi, pure_quaternion};
use rbsim_types::{MatrixExt, Pose, QuaternionExt, SpatialVector};

use crate::body::RigidBody;
use crate::state::BodyState;

/// Derived quantities of one body in one state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDynamics {
    /// Rotation matrix of the orientation.
    pub rotation: Matrix3<f64>,
    /// Mass.
    pub mass: f64,
    /// World-frame offset from the body origin to the CG.
    pub cg: Vector3<f64>,
    /// World-frame inertia about the CG.
    pub i_c: Matrix3<f64>,
    /// World-frame inverse inertia about the CG.
    pub m_c: Matrix3<f64>,
    /// World pose.
    pub pose: Pose,
    /// Twist of the body origin.
    pub motion: SpatialVector,
    /// Momentum about the body origin.
    pub momentum: SpatialVector,
}

/// Result of [`BodyDynamics::solve_for_pin`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PinSolution {
    /// Angular acceleration of the body.
    pub angular_acceleration: Vector3<f64>,
    /// Force transmitted through the pin.
    pub force: Vector3<f64>,
}

/// Result of [`BodyDynamics::solve_for_slider`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SliderSolution {
    /// Acceleration of the body origin.
    pub translational_acceleration: Vector3<f64>,
    /// Moment about the body origin.
    pub moment_about_pin: Vector3<f64>,
}

impl BodyDynamics {
    /// Build the snapshot of `body` in `state`.
    #[must_use]
    pub fn new(body: &RigidBody, state: &BodyState) -> Self {
        let pose = state.pose;
        let rotation = pose.orientation.rotation_matrix();
        let i_c = body.inertia_matrix(&rotation);
        let m_c = body.inverse_inertia_matrix(&rotation);
        let cg = pose.from_local_direction(&body.cg());
        let motion = body.motion_with(&state.momentum, &m_c, &cg);

        Self {
            rotation,
            mass: body.mass(),
            cg,
            i_c,
            m_c,
            pose,
            motion,
            momentum: state.momentum,
        }
    }

    /// Time derivative of the state under `loading`.
    ///
    /// The pose rate is `(v, ½·ω·q)` and the momentum rate is the loading.
    #[must_use]
    pub fn momentum_rate(&self, loading: &SpatialVector) -> BodyState {
        let w = pure_quaternion(&self.motion.rotational);
        let q_dot = w * self.pose.orientation * 0.5;
        BodyState::new(Pose::new(self.motion.translational, q_dot), *loading)
    }

    /// Accelerations `(a, α)` produced by a loading `(F, τ)` about the origin.
    ///
    /// `None` for a massless body, or when every entry of the inverse inertia
    /// is below the absolute [`TINY`](rbsim_types::TINY) threshold. Very large
    /// bodies (principal inertia above roughly `1/TINY`) fall under it too.
    #[must_use]
    pub fn solve_for_acceleration(&self, loading: &SpatialVector) -> Option<SpatialVector> {
        if self.mass <= 0.0 || self.m_c.near_zero() {
            return None;
        }
        let (f, tau) = (&loading.translational, &loading.rotational);
        let (w, c) = (&self.motion.rotational, &self.cg);

        let alpha = self.m_c * (tau - w.cross(&(self.i_c * w)) - c.cross(f));
        let a = f / self.mass + c.cross(&alpha) - w.cross(&w.cross(c));
        Some(SpatialVector::new(a, alpha))
    }

    /// Loading `(F, τ)` about the origin needed for accelerations `(a, α)`.
    ///
    /// `None` for a massless body or an inertia with every entry below
    /// [`TINY`](rbsim_types::TINY).
    #[must_use]
    pub fn solve_for_loading(&self, acceleration: &SpatialVector) -> Option<SpatialVector> {
        if self.mass <= 0.0 || self.i_c.near_zero() {
            return None;
        }
        let (a, alpha) = (&acceleration.translational, &acceleration.rotational);
        let (w, c) = (&self.motion.rotational, &self.cg);

        let f = (a - c.cross(alpha) + w.cross(&w.cross(c))) * self.mass;
        let tau = self.i_c * alpha + w.cross(&(self.i_c * w)) + c.cross(&f);
        Some(SpatialVector::new(f, tau))
    }

    /// Body hinged at its origin: the origin acceleration and the moment
    /// about the pin are known, the angular acceleration and pin force are
    /// not.
    ///
    /// Uses the inertia about the pin, `I_C + m·mmoi(c)`.
    #[must_use]
    pub fn solve_for_pin(
        &self,
        pin_acceleration: &Vector3<f64>,
        moment_about_pin: &Vector3<f64>,
    ) -> Option<PinSolution> {
        let i_pin = self.i_c + mmoi(&self.cg, self.mass);
        if i_pin.is_singular() {
            return None;
        }
        let (w, c) = (&self.motion.rotational, &self.cg);
        let centripetal = w.cross(&w.cross(c));

        let rhs = moment_about_pin
            - w.cross(&(self.i_c * w))
            - c.cross(&((pin_acceleration + centripetal) * self.mass));
        let alpha = i_pin.cofactor_inverse() * rhs;
        let force = (pin_acceleration - c.cross(&alpha) + centripetal) * self.mass;

        Some(PinSolution {
            angular_acceleration: alpha,
            force,
        })
    }

    /// Body on a slider at its origin: the angular acceleration and force are
    /// known, the origin acceleration and moment about the origin are not.
    #[must_use]
    pub fn solve_for_slider(
        &self,
        angular_acceleration: &Vector3<f64>,
        force: &Vector3<f64>,
    ) -> Option<SliderSolution> {
        if self.mass <= 0.0 {
            return None;
        }
        let (w, c) = (&self.motion.rotational, &self.cg);
        let alpha = angular_acceleration;

        let a = force / self.mass + c.cross(alpha) - w.cross(&w.cross(c));
        let tau = self.i_c * alpha + w.cross(&(self.i_c * w)) + c.cross(force);

        Some(SliderSolution {
            translational_acceleration: a,
            moment_about_pin: tau,
        })
    }

    /// Kinetic energy `½(p·v + L·ω)`.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.momentum.dot(&self.motion)
    }
}
