//! Muscle-Metabolics: whole-body metabolic power from musculoskeletal simulation state
//!
//! This library estimates the rate of metabolic energy expenditure of a set of
//! muscles using the Bhargava et al. (2004) model. It features:
//!
//! - Per-muscle activation, maintenance and shortening heat plus mechanical work
//! - Whole-body basal metabolic rate
//! - Bind-once, evaluate-many probe over a pluggable model/state interface
//! - Layered TOML/environment configuration with full validation
//! - Parallel evaluation of independent trial states
//!
//! # Quick Start
//!
//! ```rust
//! use muscle_metabolics::{InMemoryModel, MetabolicMuscleParameter, MetabolicPowerProbe, MuscleDynamicState};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut model = InMemoryModel::new(70.0).with_muscle("soleus_r", 4000.0, 0.05);
//!     model.set_state("soleus_r", MuscleDynamicState {
//!         excitation: 0.6,
//!         activation: 0.5,
//!         normalized_fiber_length: 1.0,
//!         fiber_velocity: -0.2,
//!         active_fiber_force: 1500.0,
//!         isometric_active_fiber_force: 2000.0,
//!         passive_fiber_force: 0.0,
//!     });
//!
//!     let mut probe = MetabolicPowerProbe::new("metabolic_power");
//!     probe.add_parameter(MetabolicMuscleParameter::with_slow_twitch_ratio("soleus_r", 0.8))?;
//!     probe.bind(&model)?;
//!
//!     let watts = probe.evaluate(&model)?;
//!     println!("{}: {:.2} W", probe.name(), watts);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod curve;
pub mod energetics;
pub mod error;
pub mod model;
pub mod parameter;
pub mod parameter_set;
pub mod probe;

// Re-export commonly used types for convenience
pub use config::{ConfigLoader, ConfigError, ProbeConfig, TermFlags};
pub use curve::{InterpolationCurve, PiecewiseLinearCurve};
pub use energetics::{EnergeticsTerms, ShorteningHeatModel};
pub use error::{ProbeError, ProbeResult};
pub use model::{
    InMemoryModel, MuscleDynamicState, MuscleProperties, MusculoskeletalModel, SimulationState,
};
pub use parameter::{MassSource, MetabolicMuscleParameter};
pub use parameter_set::MetabolicMuscleParameterSet;
pub use probe::{MetabolicPowerProbe, MetabolicReport, MuscleEnergetics};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Muscle metabolic power probe (Bhargava et al., 2004)".to_string(),
        features: vec![
            "Activation, maintenance and shortening heat rates".to_string(),
            "Mechanical work rate".to_string(),
            "Basal metabolic rate".to_string(),
            "Layered configuration management".to_string(),
            "Parallel batch evaluation".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}
