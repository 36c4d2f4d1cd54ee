//! Error types for simulation operations.

use thiserror::Error;

/// Errors that can occur while building or running a simulation.
///
/// Physically degenerate bodies (zero mass, singular inertia) are not errors:
/// the solvers report them through `Option` and the engine treats such bodies
/// as inert.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A convention or enumeration value that does not exist was requested.
    #[error("not supported: {what}")]
    NotSupported {
        /// What was requested.
        what: String,
    },

    /// A body index outside the simulation's body list.
    #[error("invalid body index: {index} (simulation has {count} bodies)")]
    InvalidBodyIndex {
        /// The requested index.
        index: usize,
        /// Number of bodies in the simulation.
        count: usize,
    },

    /// A run was requested with zero sub-steps.
    #[error("invalid step count: at least one step is required")]
    InvalidStepCount,

    /// A non-finite end time was requested.
    #[error("invalid time: {0} (must be finite)")]
    InvalidTime(f64),

    /// Simulation diverged (`NaN` or `Inf` detected).
    #[error("simulation diverged: {reason}")]
    Diverged {
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// Invalid mass properties.
    #[error("invalid mass properties: {reason}")]
    InvalidMassProperties {
        /// Description of what's wrong.
        reason: String,
    },
}

impl SimError {
    /// Create a not-supported error.
    #[must_use]
    pub fn not_supported(what: impl Into<String>) -> Self {
        Self::NotSupported { what: what.into() }
    }

    /// Create a diverged error.
    #[must_use]
    pub fn diverged(reason: impl Into<String>) -> Self {
        Self::Diverged {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an invalid mass properties error.
    #[must_use]
    pub fn invalid_mass(reason: impl Into<String>) -> Self {
        Self::InvalidMassProperties {
            reason: reason.into(),
        }
    }

    /// Check if this is a divergence error.
    #[must_use]
    pub fn is_diverged(&self) -> bool {
        matches!(self, Self::Diverged { .. })
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }

    /// Check if this is a programming error (unsupported convention).
    #[must_use]
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::InvalidBodyIndex { index: 7, count: 2 };
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains('2'));

        let err = SimError::diverged("NaN in momentum");
        assert!(err.to_string().contains("NaN"));

        let err = SimError::not_supported("axis W");
        assert!(err.to_string().contains("axis W"));
    }

    #[test]
    fn test_error_predicates() {
        let err = SimError::diverged("test");
        assert!(err.is_diverged());
        assert!(!err.is_config_error());

        let err = SimError::invalid_config("bad value");
        assert!(err.is_config_error());
        assert!(!err.is_not_supported());

        assert!(SimError::not_supported("x").is_not_supported());
    }
}
