// src/parameter.rs
//! Per-muscle metabolic parameters
//!
//! A [`MetabolicMuscleParameter`] holds the energetic constants of one muscle
//! and the muscle mass used to scale them. The mass is either supplied in the
//! configuration or derived from the muscle's architecture:
//!
//! ```text
//! m = (F_max / specific_tension) * density * L_opt
//! ```
//!
//! Whichever source applies is resolved once when the owning probe binds to
//! a model, and cached on the parameter for every subsequent evaluation.

use serde::{Deserialize, Serialize};

use crate::config::constants::parameter;
use crate::error::{ProbeError, ProbeResult};

/// Where a muscle's mass comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MassSource {
    /// Mass given explicitly in the configuration (kg)
    Provided(f64),
    /// Mass derived from max isometric force and optimal fiber length
    Derived,
}

/// Energetic constants for a single muscle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetabolicMuscleParameter {
    /// Name of the muscle in the model this entry applies to
    pub name: String,

    /// Specific tension (Pa)
    #[serde(default = "defaults::specific_tension")]
    pub specific_tension: f64,

    /// Muscle density (kg/m^3)
    #[serde(default = "defaults::density")]
    pub density: f64,

    /// Fraction of slow-twitch fibers, in [0, 1]
    #[serde(default = "defaults::ratio_slow_twitch_fibers")]
    pub ratio_slow_twitch_fibers: f64,

    /// Use `provided_muscle_mass` instead of deriving the mass
    #[serde(default)]
    pub use_provided_muscle_mass: bool,

    /// Explicit muscle mass (kg), required when `use_provided_muscle_mass`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided_muscle_mass: Option<f64>,

    /// Activation constant, slow-twitch fibers (W/kg)
    #[serde(default = "defaults::activation_constant_slow_twitch")]
    pub activation_constant_slow_twitch: f64,

    /// Activation constant, fast-twitch fibers (W/kg)
    #[serde(default = "defaults::activation_constant_fast_twitch")]
    pub activation_constant_fast_twitch: f64,

    /// Maintenance constant, slow-twitch fibers (W/kg)
    #[serde(default = "defaults::maintenance_constant_slow_twitch")]
    pub maintenance_constant_slow_twitch: f64,

    /// Maintenance constant, fast-twitch fibers (W/kg)
    #[serde(default = "defaults::maintenance_constant_fast_twitch")]
    pub maintenance_constant_fast_twitch: f64,

    #[serde(skip)]
    muscle_mass: Option<f64>,
}

mod defaults {
    use crate::config::constants::parameter::*;

    pub fn specific_tension() -> f64 { DEFAULT_SPECIFIC_TENSION }
    pub fn density() -> f64 { DEFAULT_DENSITY }
    pub fn ratio_slow_twitch_fibers() -> f64 { DEFAULT_RATIO_SLOW_TWITCH_FIBERS }
    pub fn activation_constant_slow_twitch() -> f64 { DEFAULT_ACTIVATION_CONSTANT_SLOW_TWITCH }
    pub fn activation_constant_fast_twitch() -> f64 { DEFAULT_ACTIVATION_CONSTANT_FAST_TWITCH }
    pub fn maintenance_constant_slow_twitch() -> f64 { DEFAULT_MAINTENANCE_CONSTANT_SLOW_TWITCH }
    pub fn maintenance_constant_fast_twitch() -> f64 { DEFAULT_MAINTENANCE_CONSTANT_FAST_TWITCH }
}

impl MetabolicMuscleParameter {
    /// Parameter entry with Bhargava (2004) defaults and a derived mass.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specific_tension: defaults::specific_tension(),
            density: defaults::density(),
            ratio_slow_twitch_fibers: defaults::ratio_slow_twitch_fibers(),
            use_provided_muscle_mass: false,
            provided_muscle_mass: None,
            activation_constant_slow_twitch: defaults::activation_constant_slow_twitch(),
            activation_constant_fast_twitch: defaults::activation_constant_fast_twitch(),
            maintenance_constant_slow_twitch: defaults::maintenance_constant_slow_twitch(),
            maintenance_constant_fast_twitch: defaults::maintenance_constant_fast_twitch(),
            muscle_mass: None,
        }
    }

    /// Entry with default constants and the given slow-twitch fiber ratio.
    pub fn with_slow_twitch_ratio(name: impl Into<String>, ratio_slow_twitch_fibers: f64) -> Self {
        Self {
            ratio_slow_twitch_fibers,
            ..Self::new(name)
        }
    }

    /// Entry whose mass is given explicitly rather than derived.
    pub fn with_provided_mass(
        name: impl Into<String>,
        ratio_slow_twitch_fibers: f64,
        muscle_mass: f64,
    ) -> Self {
        Self {
            ratio_slow_twitch_fibers,
            use_provided_muscle_mass: true,
            provided_muscle_mass: Some(muscle_mass),
            ..Self::new(name)
        }
    }

    /// Entry with custom activation and maintenance constants (W/kg).
    pub fn with_constants(
        name: impl Into<String>,
        ratio_slow_twitch_fibers: f64,
        activation_constant_slow_twitch: f64,
        activation_constant_fast_twitch: f64,
        maintenance_constant_slow_twitch: f64,
        maintenance_constant_fast_twitch: f64,
    ) -> Self {
        Self {
            ratio_slow_twitch_fibers,
            activation_constant_slow_twitch,
            activation_constant_fast_twitch,
            maintenance_constant_slow_twitch,
            maintenance_constant_fast_twitch,
            ..Self::new(name)
        }
    }

    /// Which mass source applies to this entry.
    ///
    /// A provided mass that is missing or NaN is a configuration error.
    pub fn mass_source(&self) -> ProbeResult<MassSource> {
        if !self.use_provided_muscle_mass {
            return Ok(MassSource::Derived);
        }

        match self.provided_muscle_mass {
            Some(mass) if !mass.is_nan() => Ok(MassSource::Provided(mass)),
            _ => Err(ProbeError::configuration(
                &self.name,
                "use_provided_muscle_mass is set but provided_muscle_mass is not",
            )),
        }
    }

    /// Resolve this muscle's mass (kg) from its architecture.
    ///
    /// Returns the provided mass when one is configured, otherwise
    /// `(max_isometric_force / specific_tension) * density * optimal_fiber_length`.
    pub fn resolve_mass(
        &self,
        max_isometric_force: f64,
        optimal_fiber_length: f64,
    ) -> ProbeResult<f64> {
        match self.mass_source()? {
            MassSource::Provided(mass) => Ok(mass),
            MassSource::Derived => Ok((max_isometric_force / self.specific_tension)
                * self.density
                * optimal_fiber_length),
        }
    }

    /// Check the record-level invariants.
    pub fn validate(&self) -> ProbeResult<()> {
        let r = self.ratio_slow_twitch_fibers;
        if !(parameter::MIN_RATIO_SLOW_TWITCH_FIBERS..=parameter::MAX_RATIO_SLOW_TWITCH_FIBERS)
            .contains(&r)
        {
            return Err(ProbeError::configuration(
                &self.name,
                format!("ratio_slow_twitch_fibers must be in [0, 1], got {}", r),
            ));
        }

        match self.mass_source()? {
            MassSource::Provided(mass) => {
                if !mass.is_finite() || mass <= 0.0 {
                    return Err(ProbeError::configuration(
                        &self.name,
                        format!("provided_muscle_mass must be positive, got {}", mass),
                    ));
                }
            }
            MassSource::Derived => {
                require_positive(&self.name, "specific_tension", self.specific_tension)?;
                require_positive(&self.name, "density", self.density)?;
            }
        }

        for (field, value) in [
            ("activation_constant_slow_twitch", self.activation_constant_slow_twitch),
            ("activation_constant_fast_twitch", self.activation_constant_fast_twitch),
            ("maintenance_constant_slow_twitch", self.maintenance_constant_slow_twitch),
            ("maintenance_constant_fast_twitch", self.maintenance_constant_fast_twitch),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProbeError::configuration(
                    &self.name,
                    format!("{} must be finite and non-negative, got {}", field, value),
                ));
            }
        }

        Ok(())
    }

    /// Cached muscle mass (kg); `None` until the owning probe binds.
    pub fn muscle_mass(&self) -> Option<f64> {
        self.muscle_mass
    }

    /// Set by the probe at bind time.
    pub(crate) fn set_muscle_mass(&mut self, mass: f64) {
        self.muscle_mass = Some(mass);
    }

    pub(crate) fn clear_muscle_mass(&mut self) {
        self.muscle_mass = None;
    }
}

fn require_positive(component: &str, field: &str, value: f64) -> ProbeResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ProbeError::configuration(
            component,
            format!("{} must be positive, got {}", field, value),
        ))
    }
}
