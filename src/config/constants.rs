// src/config/constants.rs
//! Default constants for metabolic parameters, the probe and its curve

/// Per-muscle metabolic parameter defaults (Bhargava et al., 2004)
pub mod parameter {
    /// Specific tension of mammalian muscle (Pa)
    pub const DEFAULT_SPECIFIC_TENSION: f64 = 0.25e6;
    /// Density of mammalian muscle (kg/m^3)
    pub const DEFAULT_DENSITY: f64 = 1059.7;
    pub const DEFAULT_RATIO_SLOW_TWITCH_FIBERS: f64 = 0.5;

    // W/kg
    pub const DEFAULT_ACTIVATION_CONSTANT_SLOW_TWITCH: f64 = 40.0;
    pub const DEFAULT_ACTIVATION_CONSTANT_FAST_TWITCH: f64 = 133.0;
    pub const DEFAULT_MAINTENANCE_CONSTANT_SLOW_TWITCH: f64 = 74.0;
    pub const DEFAULT_MAINTENANCE_CONSTANT_FAST_TWITCH: f64 = 111.0;

    pub const MIN_RATIO_SLOW_TWITCH_FIBERS: f64 = 0.0;
    pub const MAX_RATIO_SLOW_TWITCH_FIBERS: f64 = 1.0;
}

/// Whole-probe defaults
pub mod probe {
    pub const DEFAULT_PROBE_NAME: &str = "metabolic_power";
    pub const DEFAULT_BASAL_COEFFICIENT: f64 = 1.2;
    pub const DEFAULT_BASAL_EXPONENT: f64 = 1.0;

    /// Floor on per-muscle heat rate, scaled by muscle mass (W/kg, Umberger 2003)
    pub const MINIMUM_HEAT_RATE_PER_KG: f64 = 1.0;

    /// The probe reports a single aggregate column
    pub const NUM_OUTPUTS: usize = 1;
}

/// Shortening-heat proportionality constants
pub mod shortening {
    pub const FORCE_DEPENDENT_ISOMETRIC_COEFF: f64 = 0.16;
    pub const FORCE_DEPENDENT_ACTIVE_COEFF: f64 = 0.18;
    pub const FORCE_DEPENDENT_NEGATIVE_VELOCITY_COEFF: f64 = 0.157;
    pub const FORCE_INDEPENDENT_COEFF: f64 = 0.25;
}

/// Default normalized-fiber-length dependence of the maintenance heat rate
pub mod curve {
    pub const DEFAULT_MAINTENANCE_CURVE_X: [f64; 5] = [0.0, 0.5, 1.0, 1.5, 10.0];
    pub const DEFAULT_MAINTENANCE_CURVE_Y: [f64; 5] = [0.5, 0.5, 1.0, 0.5, 0.5];
}

/// Configuration sources
pub mod paths {
    pub const DEFAULT_CONFIG_FILE: &str = "metabolics.toml";
    pub const LOCAL_CONFIG_FILE: &str = "metabolics.local.toml";
    pub const ENV_PREFIX: &str = "METABOLIC";
    pub const ENV_SEPARATOR: &str = "__";
}
