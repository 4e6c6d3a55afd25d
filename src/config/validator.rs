// src/config/validator.rs
//! Configuration validation
//!
//! Unlike the fail-fast checks on individual records, the validator walks the
//! whole [`ProbeConfig`] and reports every violation it finds, keyed by the
//! dotted field path.

use crate::config::constants::parameter;
use crate::config::ProbeConfig;
use crate::parameter::MetabolicMuscleParameter;

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub value: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation error for '{}': {} (value: {})", self.field, self.message, self.value)
    }
}

impl std::error::Error for ValidationError {}

/// Field constraints applied to numeric configuration values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldConstraint {
    /// Inclusive range
    Range { min: f64, max: f64 },
    /// Finite and strictly positive
    Positive,
    /// Finite and not negative
    NonNegative,
    /// Any finite value
    Finite,
}

impl FieldConstraint {
    fn check(&self, value: f64) -> Option<String> {
        match *self {
            FieldConstraint::Range { min, max } => (!(min..=max).contains(&value))
                .then(|| format!("must be in [{}, {}]", min, max)),
            FieldConstraint::Positive => (!(value.is_finite() && value > 0.0))
                .then(|| "must be finite and positive".to_string()),
            FieldConstraint::NonNegative => (!(value.is_finite() && value >= 0.0))
                .then(|| "must be finite and non-negative".to_string()),
            FieldConstraint::Finite => (!value.is_finite()).then(|| "must be finite".to_string()),
        }
    }
}

/// Validator for [`ProbeConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigValidator {
    errors: Vec<ValidationError>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a complete probe configuration.
    pub fn validate(mut self, config: &ProbeConfig) -> Result<(), Vec<ValidationError>> {
        if config.name.trim().is_empty() {
            self.push("name", "probe name must not be empty", &config.name);
        }

        self.check("basal_coefficient", config.basal_coefficient, FieldConstraint::Finite);
        self.check("basal_exponent", config.basal_exponent, FieldConstraint::Finite);

        let curve = &config.normalized_fiber_length_dependence_on_maintenance_rate;
        if curve.is_empty() {
            self.push(
                "normalized_fiber_length_dependence_on_maintenance_rate",
                "curve needs at least one knot",
                "[]",
            );
        }

        for (i, param) in config.metabolic_parameters.iter().enumerate() {
            self.validate_parameter(i, param);
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn validate_parameter(&mut self, i: usize, param: &MetabolicMuscleParameter) {
        let prefix = format!("metabolic_parameters[{}]", i);

        if param.name.trim().is_empty() {
            self.push(&format!("{}.name", prefix), "muscle name must not be empty", &param.name);
        }

        self.check(
            &format!("{}.ratio_slow_twitch_fibers", prefix),
            param.ratio_slow_twitch_fibers,
            FieldConstraint::Range {
                min: parameter::MIN_RATIO_SLOW_TWITCH_FIBERS,
                max: parameter::MAX_RATIO_SLOW_TWITCH_FIBERS,
            },
        );

        if param.use_provided_muscle_mass {
            match param.provided_muscle_mass {
                Some(mass) => self.check(
                    &format!("{}.provided_muscle_mass", prefix),
                    mass,
                    FieldConstraint::Positive,
                ),
                None => self.push(
                    &format!("{}.provided_muscle_mass", prefix),
                    "required when use_provided_muscle_mass is true",
                    "<unset>",
                ),
            }
        } else {
            self.check(&format!("{}.specific_tension", prefix), param.specific_tension, FieldConstraint::Positive);
            self.check(&format!("{}.density", prefix), param.density, FieldConstraint::Positive);
        }

        for (field, value) in [
            ("activation_constant_slow_twitch", param.activation_constant_slow_twitch),
            ("activation_constant_fast_twitch", param.activation_constant_fast_twitch),
            ("maintenance_constant_slow_twitch", param.maintenance_constant_slow_twitch),
            ("maintenance_constant_fast_twitch", param.maintenance_constant_fast_twitch),
        ] {
            self.check(&format!("{}.{}", prefix, field), value, FieldConstraint::NonNegative);
        }
    }

    fn check(&mut self, field: &str, value: f64, constraint: FieldConstraint) {
        if let Some(message) = constraint.check(value) {
            self.push(field, &message, &value.to_string());
        }
    }

    fn push(&mut self, field: &str, message: &str, value: &str) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
            value: value.to_string(),
        });
    }
}
