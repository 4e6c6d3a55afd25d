// src/error.rs
//! Unified error handling for the metabolic probe
//!
//! Every failure in this crate is a configuration-time failure: malformed
//! parameter records, a parameter entry naming a muscle the model does not
//! have, or evaluating a probe that was never bound. Evaluation itself does
//! not fail for a bound probe; non-finite inputs propagate as non-finite
//! outputs.

use thiserror::Error;

use crate::config::ConfigError;

/// Unified error type for probe configuration, binding and evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    /// Invalid parameter, curve or probe configuration
    #[error("[CONFIG] Configuration error in {component}: {reason}")]
    Configuration {
        /// Component that rejected the configuration (parameter or probe name)
        component: String,
        /// Human-readable description of the violation
        reason: String,
    },

    /// A parameter entry names a muscle that is absent from the model
    #[error("[BIND] Probe '{probe}' references muscle '{muscle}' which is not in the model")]
    UnresolvedMuscle {
        /// Probe that attempted the bind
        probe: String,
        /// Muscle name that could not be resolved
        muscle: String,
    },

    /// Two parameter entries share the same muscle name
    #[error("[CONFIG] Duplicate metabolic parameter for muscle '{name}'")]
    DuplicateParameter {
        /// The clashing muscle name
        name: String,
    },

    /// The evaluated state has no muscle, or a different muscle, at a bound index
    #[error("[EVAL] Probe '{probe}' expected muscle '{muscle}' at index {index} of the simulation state, found {found}")]
    StateMismatch {
        /// Probe that was evaluated
        probe: String,
        /// Bound muscle name
        muscle: String,
        /// Index resolved at bind time
        index: usize,
        /// What the state holds at that index
        found: String,
    },

    /// Evaluation requested before a successful bind
    #[error("[BIND] Probe '{probe}' is not bound to a model")]
    NotBound {
        /// Probe that was evaluated
        probe: String,
    },
}

impl ProbeError {
    /// Creates a configuration error.
    pub fn configuration(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unresolved-muscle error.
    pub fn unresolved_muscle(probe: impl Into<String>, muscle: impl Into<String>) -> Self {
        Self::UnresolvedMuscle {
            probe: probe.into(),
            muscle: muscle.into(),
        }
    }

    /// True for errors raised while reading or checking configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::DuplicateParameter { .. }
        )
    }
}

impl From<ConfigError> for ProbeError {
    fn from(err: ConfigError) -> Self {
        ProbeError::configuration("config_loader", err.to_string())
    }
}

/// Result type alias for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;
