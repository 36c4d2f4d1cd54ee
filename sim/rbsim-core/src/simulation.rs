//! The simulation engine.
//!
//! [`Simulation`] owns an append-only list of bodies and one state per body,
//! and advances the states with the classical fourth-order Runge-Kutta method.
//!
//! # Stepping
//!
//! ```text
//! k0 = rate(s,                     t)
//! k1 = rate(norm(s + h/2·k0),      t + h/2)
//! k2 = rate(norm(s + h/2·k1),      t + h/2)
//! k3 = rate(norm(s + h·k2),        t + h)
//! s' = norm(s + h/6·k0 + h/3·k1 + h/3·k2 + h/6·k3)
//! ```
//!
//! `norm` renormalizes orientations. Every stage finishes for all bodies
//! before the next one starts.
//!
//! Each sub-step is the smallest of the nominal step, the rotation bound
//! from [`Simulation::estimate_max_time_step`], and the time left to the end
//! of the run.
//!
//! # Lifecycle
//!
//! `Empty → reset() → Ready → run*() → Ready …`. The run methods reset on
//! their own when the simulation was never reset. Step observers fire once
//! after every reset and once after every completed sub-step.

use std::fmt;

use nalgebra::Vector3;
use rbsim_types::{Pose, Result, SimError, SimulationConfig, SpatialVector, TINY};
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::body::RigidBody;
use crate::callbacks::{CollisionHook, LoadingFn};
use crate::dynamics::BodyDynamics;
use crate::geometry::Solid;
use crate::state::BodyState;

/// Classical RK4 weights.
const RK4_WEIGHTS: [f64; 4] = [1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0];

/// Observer notified after reset and after every sub-step.
pub type StepObserver = Box<dyn FnMut(&Simulation) + Send>;

/// Free rigid bodies under gravity and user loading.
pub struct Simulation {
    config: SimulationConfig,
    bodies: Vec<RigidBody>,
    states: Vec<BodyState>,
    time: f64,
    ready: bool,
    observers: Vec<StepObserver>,
    collision_hook: Option<CollisionHook>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("bodies", &self.bodies.len())
            .field("time", &self.time)
            .field("ready", &self.ready)
            .field("observers", &self.observers.len())
            .field("collision_hook", &self.collision_hook)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Empty simulation with the default configuration (zero gravity).
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
            bodies: Vec::new(),
            states: Vec::new(),
            time: 0.0,
            ready: false,
            observers: Vec::new(),
            collision_hook: None,
        }
    }

    /// Empty simulation with a validated configuration.
    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Gravitational acceleration.
    #[must_use]
    pub fn gravity(&self) -> Vector3<f64> {
        self.config.gravity.acceleration
    }

    /// Change the gravitational acceleration.
    pub fn set_gravity(&mut self, gravity: Vector3<f64>) {
        self.config.gravity.acceleration = gravity;
    }

    /// Elapsed simulated time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// All bodies, in insertion order.
    #[must_use]
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    /// Current states, index-aligned with [`bodies`](Self::bodies).
    /// Empty until the first reset.
    #[must_use]
    pub fn states(&self) -> &[BodyState] {
        &self.states
    }

    /// Number of bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Whether [`reset`](Self::reset) has run.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Build a body from a solid and add it. Returns its index.
    pub fn add_body(
        &mut self,
        mass: f64,
        solid: impl Solid + 'static,
        initial_pose: Pose,
        initial_motion: SpatialVector,
    ) -> usize {
        self.add_rigid_body(RigidBody::new(mass, solid, initial_pose, initial_motion))
    }

    /// Add a prepared body. Returns its index.
    ///
    /// A body added after a reset joins at its initial state at the current
    /// time.
    pub fn add_rigid_body(&mut self, body: RigidBody) -> usize {
        if self.ready {
            self.states.push(BodyState::initial(&body));
        }
        debug!(index = self.bodies.len(), %body, "body added");
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    /// Replace the loading callback of a body.
    pub fn set_loading(&mut self, index: usize, loading: Option<LoadingFn>) -> Result<()> {
        let count = self.bodies.len();
        let body = self
            .bodies
            .get_mut(index)
            .ok_or(SimError::InvalidBodyIndex { index, count })?;
        body.set_loading(loading);
        Ok(())
    }

    /// Register a step observer.
    pub fn on_step(&mut self, observer: impl FnMut(&Simulation) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Install or remove the collision hook.
    pub fn set_collision_hook(&mut self, hook: Option<CollisionHook>) {
        self.collision_hook = hook;
    }

    /// Rewind to time zero with every body at its initial state.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.states = self.bodies.iter().map(BodyState::initial).collect();
        self.ready = true;
        debug!(bodies = self.bodies.len(), "simulation reset");
        self.notify();
    }

    /// Dynamics snapshot of one body in its current state.
    pub fn body_dynamics(&self, index: usize) -> Result<BodyDynamics> {
        let count = self.bodies.len();
        match (self.bodies.get(index), self.states.get(index)) {
            (Some(body), Some(state)) => Ok(BodyDynamics::new(body, state)),
            _ => Err(SimError::InvalidBodyIndex { index, count }),
        }
    }

    /// Applied wrench on every body: weight at the body origin plus the
    /// loading callback, both about the world origin.
    #[must_use]
    pub fn loading(&self, time: f64, states: &[BodyState]) -> Vec<SpatialVector> {
        let gravity = self.gravity();
        self.bodies
            .iter()
            .zip(states)
            .map(|(body, state)| {
                let motion = BodyDynamics::new(body, state).motion;
                body_loading(body, state, &motion, &gravity, time)
            })
            .collect()
    }

    /// Time derivative of every state at `time`.
    #[must_use]
    pub fn rates(&self, states: &[BodyState], time: f64) -> Vec<BodyState> {
        let gravity = self.gravity();

        #[cfg(feature = "parallel")]
        {
            let parallel = &self.config.parallel;
            if parallel.enabled && self.bodies.len() >= parallel.min_bodies {
                return self
                    .bodies
                    .par_iter()
                    .zip(states.par_iter())
                    .map(|(body, state)| body_rate(body, state, &gravity, time))
                    .collect();
            }
        }

        self.bodies
            .iter()
            .zip(states)
            .map(|(body, state)| body_rate(body, state, &gravity, time))
            .collect()
    }

    /// One RK4 step of size `h` from `states` at the current time.
    #[must_use]
    pub fn integrate(&self, states: &[BodyState], h: f64) -> Vec<BodyState> {
        let trial = |rate: &[BodyState], dt: f64| -> Vec<BodyState> {
            states
                .iter()
                .zip(rate)
                .map(|(state, k)| state.add_scaled(k, dt).normalized())
                .collect()
        };

        let t = self.time;
        let k0 = self.rates(states, t);
        let k1 = self.rates(&trial(&k0, h / 2.0), t + h / 2.0);
        let k2 = self.rates(&trial(&k1, h / 2.0), t + h / 2.0);
        let k3 = self.rates(&trial(&k2, h), t + h);

        let [w0, w1, w2, w3] = RK4_WEIGHTS.map(|w| w * h);
        states
            .iter()
            .zip(&k0)
            .zip(&k1)
            .zip(&k2)
            .zip(&k3)
            .map(|((((state, a), b), c), d)| {
                state
                    .add_scaled(a, w0)
                    .add_scaled(b, w1)
                    .add_scaled(c, w2)
                    .add_scaled(d, w3)
                    .normalized()
            })
            .collect()
    }

    /// Largest sub-step that keeps every body's rotation within
    /// `config.max_step_rotation`, or 1 when nothing rotates.
    ///
    /// Before the first reset the initial motions are used.
    #[must_use]
    pub fn estimate_max_time_step(&self) -> f64 {
        let omega_max = if self.ready {
            self.bodies
                .iter()
                .zip(&self.states)
                .map(|(body, state)| {
                    body.motion(&state.pose.orientation, &state.momentum)
                        .rotational
                        .norm()
                })
                .fold(0.0, f64::max)
        } else {
            self.bodies
                .iter()
                .map(|body| body.initial_motion().rotational.norm())
                .fold(0.0, f64::max)
        };

        if omega_max > 0.0 {
            self.config.max_step_rotation / omega_max
        } else {
            1.0
        }
    }

    /// Advance to `end_time` with a nominal `n_steps` sub-steps. Returns the
    /// number of sub-steps taken, which is larger when the rotation bound
    /// cuts the nominal step.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidStepCount`] for zero steps,
    /// [`SimError::InvalidTime`] for a non-finite end time, and
    /// [`SimError::Diverged`] if the sub-step collapses to zero or becomes too
    /// small to advance the clock.
    #[allow(clippy::cast_precision_loss)]
    pub fn run_until(&mut self, end_time: f64, n_steps: usize) -> Result<usize> {
        if n_steps == 0 {
            return Err(SimError::InvalidStepCount);
        }
        if !end_time.is_finite() {
            return Err(SimError::InvalidTime(end_time));
        }
        if !self.ready {
            self.reset();
        }

        let h = (end_time - self.time) / n_steps as f64;
        debug!(
            start = self.time,
            end_time,
            n_steps,
            bodies = self.bodies.len(),
            "run started"
        );

        let mut taken = 0;
        while self.time < end_time {
            let remaining = end_time - self.time;
            let mut h_next = h.min(self.estimate_max_time_step()).min(remaining);
            // fold a rounding-sized leftover into this sub-step
            let last = remaining - h_next <= TINY * end_time.abs().max(1.0);
            if last {
                h_next = remaining;
            }
            // a sub-step below one ulp of the clock would never advance it
            if h_next.is_nan() || h_next <= 0.0 || (!last && self.time + h_next <= self.time) {
                return Err(SimError::diverged(format!(
                    "sub-step collapsed to {h_next} at t = {}",
                    self.time
                )));
            }

            let mut next = self.integrate(&self.states, h_next);
            if let Some(hook) = &self.collision_hook {
                hook.apply(self.time + h_next, &self.bodies, &mut next);
            }
            self.states = next;
            self.time = if last { end_time } else { self.time + h_next };
            taken += 1;

            trace!(time = self.time, step = h_next, "sub-step");
            self.notify();
        }

        debug!(time = self.time, steps = taken, "run finished");
        Ok(taken)
    }

    /// Advance to `end_time` using the rotation bound as the nominal step.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn run(&mut self, end_time: f64) -> Result<usize> {
        if !end_time.is_finite() {
            return Err(SimError::InvalidTime(end_time));
        }
        if !self.ready {
            self.reset();
        }
        if end_time <= self.time {
            return Ok(0);
        }
        let h = self.estimate_max_time_step();
        let n_steps = ((end_time - self.time) / h).ceil().max(1.0) as usize;
        self.run_until(end_time, n_steps)
    }

    /// Advance by `n_steps` sub-steps of the current rotation-bound size.
    #[allow(clippy::cast_precision_loss)]
    pub fn run_steps(&mut self, n_steps: usize) -> Result<usize> {
        if n_steps == 0 {
            return Err(SimError::InvalidStepCount);
        }
        if !self.ready {
            self.reset();
        }
        let h = self.estimate_max_time_step();
        self.run_until(self.time + h * n_steps as f64, n_steps)
    }

    /// Report the first body whose state is no longer finite.
    pub fn check_finite(&self) -> Result<()> {
        if !self.time.is_finite() {
            return Err(SimError::diverged(format!("time is {}", self.time)));
        }
        for (index, state) in self.states.iter().enumerate() {
            if !state.all_finite() {
                return Err(SimError::diverged(format!(
                    "body {index} has a non-finite state: {state}"
                )));
            }
        }
        Ok(())
    }

    /// Sum of the kinetic energies of all bodies.
    #[must_use]
    pub fn total_kinetic_energy(&self) -> f64 {
        self.bodies
            .iter()
            .zip(&self.states)
            .map(|(body, state)| BodyDynamics::new(body, state).kinetic_energy())
            .sum()
    }

    /// Sum of the linear momenta of all bodies.
    #[must_use]
    pub fn total_linear_momentum(&self) -> Vector3<f64> {
        self.states.iter().map(|s| s.momentum.translational).sum()
    }

    fn notify(&mut self) {
        let mut observers = std::mem::take(&mut self.observers);
        for observer in &mut observers {
            observer(self);
        }
        self.observers = observers;
    }
}

fn body_loading(
    body: &RigidBody,
    state: &BodyState,
    motion: &SpatialVector,
    gravity: &Vector3<f64>,
    time: f64,
) -> SpatialVector {
    let weight = SpatialVector::wrench_at(&(gravity * body.mass()), &state.pose.position, 0.0);
    match body.loading() {
        Some(loading) => weight + loading.evaluate(time, &state.pose, motion),
        None => weight,
    }
}

fn body_rate(body: &RigidBody, state: &BodyState, gravity: &Vector3<f64>, time: f64) -> BodyState {
    let dynamics = BodyDynamics::new(body, state);
    let loading = body_loading(body, state, &dynamics.motion, gravity, time);
    dynamics.momentum_rate(&loading)
}
