// src/energetics.rs
//! Per-muscle heat and work rates (Bhargava et al., 2004)
//!
//! All four terms are computed unconditionally; enabling, disabling and
//! clamping them is the probe's job.
//!
//! ```text
//! Adot = m * [ A_slow * r * sin(pi/2 * u) + A_fast * (1 - r) * (1 - cos(pi/2 * u)) ]
//! Mdot = m * f(l) * [ M_slow * r * sin(pi/2 * u) + M_fast * (1 - r) * (1 - cos(pi/2 * u)) ]
//! Sdot = -alpha * v_CE
//! Wdot = -F_CE * v_CE   (v_CE >= 0),   0   (v_CE < 0)
//! ```
//!
//! Fiber velocity `v_CE` is positive when lengthening. The shortening-heat
//! proportionality constant `alpha` depends on the sign of `v_CE` and on
//! [`ShorteningHeatModel`]:
//!
//! | model            | `v_CE >= 0`                    | `v_CE < 0`     |
//! |------------------|--------------------------------|----------------|
//! | ForceIndependent | `0.25 * (F_CE + F_PASSIVE)`    | `0`            |
//! | ForceDependent   | `0.16 * F_CE_iso + 0.18 * F_CE`| `0.157 * F_CE` |
//!
//! These branch assignments and the resulting signs are reproduced exactly,
//! including a negative `Sdot` whenever `alpha > 0` and `v_CE > 0`.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::config::constants::shortening;
use crate::curve::InterpolationCurve;
use crate::model::MuscleDynamicState;
use crate::parameter::MetabolicMuscleParameter;

/// Choice of shortening-heat proportionality constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShorteningHeatModel {
    /// `alpha = 0.25 * (F_CE + F_PASSIVE)` for `v_CE >= 0`, else 0
    #[default]
    ForceIndependent,
    /// `alpha = 0.16 * F_CE_iso + 0.18 * F_CE` for `v_CE >= 0`, else `0.157 * F_CE`
    ForceDependent,
}

impl ShorteningHeatModel {
    /// Map `use_force_dependent_shortening_prop_constant` to a model.
    pub fn from_force_dependent_flag(force_dependent: bool) -> Self {
        if force_dependent {
            Self::ForceDependent
        } else {
            Self::ForceIndependent
        }
    }

    /// Proportionality constant `alpha` (N) for the given state.
    pub fn alpha(&self, state: &MuscleDynamicState) -> f64 {
        let lengthening_or_isometric = state.fiber_velocity >= 0.0;
        match (self, lengthening_or_isometric) {
            (Self::ForceDependent, true) => {
                shortening::FORCE_DEPENDENT_ISOMETRIC_COEFF * state.isometric_active_fiber_force
                    + shortening::FORCE_DEPENDENT_ACTIVE_COEFF * state.active_fiber_force
            }
            (Self::ForceDependent, false) => {
                shortening::FORCE_DEPENDENT_NEGATIVE_VELOCITY_COEFF * state.active_fiber_force
            }
            (Self::ForceIndependent, true) => {
                shortening::FORCE_INDEPENDENT_COEFF
                    * (state.active_fiber_force + state.passive_fiber_force)
            }
            (Self::ForceIndependent, false) => 0.0,
        }
    }
}

/// Heat and work rates of a single muscle (W)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergeticsTerms {
    /// Activation heat rate, `Adot`
    pub activation: f64,
    /// Maintenance heat rate, `Mdot`
    pub maintenance: f64,
    /// Shortening heat rate, `Sdot`
    pub shortening: f64,
    /// Mechanical work rate, `Wdot`
    pub mechanical_work: f64,
}

impl EnergeticsTerms {
    /// `Adot + Mdot + Sdot`
    pub fn heat_rate(&self) -> f64 {
        self.activation + self.maintenance + self.shortening
    }

    /// `Adot + Mdot + Sdot + Wdot`
    pub fn total(&self) -> f64 {
        self.heat_rate() + self.mechanical_work
    }
}

/// Fiber-type weighted excitation factors `(slow, fast)`:
/// `(r * sin(pi/2 * u), (1 - r) * (1 - cos(pi/2 * u)))`.
fn recruitment_factors(ratio_slow_twitch: f64, excitation: f64) -> (f64, f64) {
    let phase = FRAC_PI_2 * excitation;
    (
        ratio_slow_twitch * phase.sin(),
        (1.0 - ratio_slow_twitch) * (1.0 - phase.cos()),
    )
}

/// Activation heat rate `Adot` (W).
pub fn activation_heat_rate(
    params: &MetabolicMuscleParameter,
    mass: f64,
    state: &MuscleDynamicState,
) -> f64 {
    let (slow, fast) = recruitment_factors(params.ratio_slow_twitch_fibers, state.excitation);
    mass * (params.activation_constant_slow_twitch * slow
        + params.activation_constant_fast_twitch * fast)
}

/// Maintenance heat rate `Mdot` (W).
pub fn maintenance_heat_rate(
    params: &MetabolicMuscleParameter,
    mass: f64,
    state: &MuscleDynamicState,
    curve: &dyn InterpolationCurve,
) -> f64 {
    let (slow, fast) = recruitment_factors(params.ratio_slow_twitch_fibers, state.excitation);
    let length_dependence = curve.evaluate(state.normalized_fiber_length);
    mass * length_dependence
        * (params.maintenance_constant_slow_twitch * slow
            + params.maintenance_constant_fast_twitch * fast)
}

/// Shortening heat rate `Sdot = -alpha * v_CE` (W).
pub fn shortening_heat_rate(state: &MuscleDynamicState, model: ShorteningHeatModel) -> f64 {
    -model.alpha(state) * state.fiber_velocity
}

/// Mechanical work rate `Wdot` (W).
pub fn mechanical_work_rate(state: &MuscleDynamicState) -> f64 {
    if state.fiber_velocity >= 0.0 {
        -state.active_fiber_force * state.fiber_velocity
    } else {
        0.0
    }
}

/// Compute all four per-muscle terms.
///
/// `mass` is the muscle's resolved mass (kg). Non-finite inputs propagate
/// into the result unchanged.
pub fn compute_terms(
    params: &MetabolicMuscleParameter,
    mass: f64,
    state: &MuscleDynamicState,
    curve: &dyn InterpolationCurve,
    shortening_model: ShorteningHeatModel,
) -> EnergeticsTerms {
    EnergeticsTerms {
        activation: activation_heat_rate(params, mass, state),
        maintenance: maintenance_heat_rate(params, mass, state, curve),
        shortening: shortening_heat_rate(state, shortening_model),
        mechanical_work: mechanical_work_rate(state),
    }
}
