// src/config/mod.rs
//! Probe configuration: serde records, defaults, loading and validation

pub mod constants;
pub mod loader;
pub mod validator;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};
pub use validator::{ConfigValidator, ValidationError};

use serde::{Deserialize, Serialize};

use crate::curve::PiecewiseLinearCurve;
use crate::energetics::ShorteningHeatModel;
use crate::parameter_set::MetabolicMuscleParameterSet;

/// Enable flags for the individual metabolic terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TermFlags {
    #[serde(default = "defaults::enabled")]
    pub activation_rate_on: bool,

    #[serde(default = "defaults::enabled")]
    pub maintenance_rate_on: bool,

    #[serde(default = "defaults::enabled")]
    pub shortening_rate_on: bool,

    #[serde(default = "defaults::enabled")]
    pub basal_rate_on: bool,

    #[serde(default = "defaults::enabled")]
    pub mechanical_work_rate_on: bool,

    /// Clamp `Adot + Mdot + Sdot` to 1.0 W/kg per muscle. Only takes effect
    /// when activation, maintenance and shortening are all on.
    #[serde(default = "defaults::enabled")]
    pub enforce_minimum_heat_rate_per_muscle: bool,
}

impl TermFlags {
    /// Every term on, minimum heat rate enforced
    pub fn all() -> Self {
        Self {
            activation_rate_on: true,
            maintenance_rate_on: true,
            shortening_rate_on: true,
            basal_rate_on: true,
            mechanical_work_rate_on: true,
            enforce_minimum_heat_rate_per_muscle: true,
        }
    }

    /// Every term off
    pub fn none() -> Self {
        Self {
            activation_rate_on: false,
            maintenance_rate_on: false,
            shortening_rate_on: false,
            basal_rate_on: false,
            mechanical_work_rate_on: false,
            enforce_minimum_heat_rate_per_muscle: false,
        }
    }

    /// Whether the per-muscle heat-rate floor applies
    pub fn clamps_heat_rate(&self) -> bool {
        self.enforce_minimum_heat_rate_per_muscle
            && self.activation_rate_on
            && self.maintenance_rate_on
            && self.shortening_rate_on
    }
}

impl Default for TermFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Complete configuration of a metabolic power probe
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// Probe name; also the single output label
    #[serde(default = "defaults::name")]
    pub name: String,

    #[serde(flatten)]
    pub flags: TermFlags,

    #[serde(default = "defaults::basal_coefficient")]
    pub basal_coefficient: f64,

    #[serde(default = "defaults::basal_exponent")]
    pub basal_exponent: f64,

    #[serde(default)]
    pub use_force_dependent_shortening_prop_constant: bool,

    #[serde(default)]
    pub normalized_fiber_length_dependence_on_maintenance_rate: PiecewiseLinearCurve,

    #[serde(default)]
    pub metabolic_parameters: MetabolicMuscleParameterSet,
}

mod defaults {
    use crate::config::constants::probe;

    pub fn enabled() -> bool { true }
    pub fn name() -> String { probe::DEFAULT_PROBE_NAME.to_string() }
    pub fn basal_coefficient() -> f64 { probe::DEFAULT_BASAL_COEFFICIENT }
    pub fn basal_exponent() -> f64 { probe::DEFAULT_BASAL_EXPONENT }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            name: defaults::name(),
            flags: TermFlags::default(),
            basal_coefficient: defaults::basal_coefficient(),
            basal_exponent: defaults::basal_exponent(),
            use_force_dependent_shortening_prop_constant: false,
            normalized_fiber_length_dependence_on_maintenance_rate: PiecewiseLinearCurve::default(),
            metabolic_parameters: MetabolicMuscleParameterSet::default(),
        }
    }
}

impl ProbeConfig {
    pub fn shortening_heat_model(&self) -> ShorteningHeatModel {
        ShorteningHeatModel::from_force_dependent_flag(
            self.use_force_dependent_shortening_prop_constant,
        )
    }

    /// Validate the whole configuration, collecting every violation.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        ConfigValidator::new().validate(self)
    }

    /// Summary for display/logging
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            name: self.name.clone(),
            muscle_count: self.metabolic_parameters.len(),
            flags: self.flags,
            force_dependent_shortening: self.use_force_dependent_shortening_prop_constant,
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub name: String,
    pub muscle_count: usize,
    pub flags: TermFlags,
    pub force_dependent_shortening: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::MetabolicMuscleParameter;

    #[test]
    fn test_default_config_creation() {
        let config = ProbeConfig::default();
        assert_eq!(config.name, probe::DEFAULT_PROBE_NAME);
        assert_eq!(config.basal_coefficient, 1.2);
        assert_eq!(config.basal_exponent, 1.0);
        assert!(!config.use_force_dependent_shortening_prop_constant);
        assert_eq!(config.flags, TermFlags::all());
        assert!(config.metabolic_parameters.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = ProbeConfig::default();
        config
            .metabolic_parameters
            .add(MetabolicMuscleParameter::with_provided_mass("soleus_r", 0.8, 0.5))
            .unwrap();
        config.flags.basal_rate_on = false;

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: ProbeConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ProbeConfig = toml::from_str(
            r#"
name = "walking_metabolics"
basal_rate_on = false

[[metabolic_parameters]]
name = "soleus_r"
"#,
        )
        .unwrap();

        assert_eq!(config.name, "walking_metabolics");
        assert!(!config.flags.basal_rate_on);
        assert!(config.flags.activation_rate_on);
        assert_eq!(config.metabolic_parameters.len(), 1);
        assert_eq!(
            config.normalized_fiber_length_dependence_on_maintenance_rate,
            PiecewiseLinearCurve::default()
        );
    }

    #[test]
    fn test_clamp_requires_all_heat_terms() {
        let mut flags = TermFlags::all();
        assert!(flags.clamps_heat_rate());

        flags.shortening_rate_on = false;
        assert!(!flags.clamps_heat_rate());

        assert!(!TermFlags::none().clamps_heat_rate());
    }

    #[test]
    fn test_summary() {
        let config = ProbeConfig::default();
        let summary = config.summary();
        assert_eq!(summary.muscle_count, 0);
        assert_eq!(summary.name, config.name);
    }
}
