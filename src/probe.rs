// src/probe.rs
//! Muscle metabolic power probe
//!
//! Whole-body metabolic power is the basal rate plus the sum, over every
//! configured muscle, of heat liberated and work done:
//!
//! ```text
//! Edot = Bdot + sum(Adot + Mdot + Sdot + Wdot)
//! Bdot = basal_coefficient * m_body ^ basal_exponent
//! ```
//!
//! Using the probe has two phases. [`MetabolicPowerProbe::bind`] resolves
//! each parameter entry against a [`MusculoskeletalModel`] and caches the
//! muscle masses; it is the only place configuration problems surface.
//! [`MetabolicPowerProbe::evaluate`] then reads a [`SimulationState`] and
//! is a pure function of it, so it can be called any number of times per
//! integration step with different trial states.

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::constants::probe;
use crate::config::{ProbeConfig, TermFlags};
use crate::curve::{InterpolationCurve, PiecewiseLinearCurve};
use crate::energetics::{compute_terms, EnergeticsTerms, ShorteningHeatModel};
use crate::error::{ProbeError, ProbeResult};
use crate::model::{MuscleDynamicState, MusculoskeletalModel, SimulationState};
use crate::parameter::MetabolicMuscleParameter;
use crate::parameter_set::MetabolicMuscleParameterSet;

/// Resolved muscle, in parameter-set order
#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundMuscle {
    model_index: usize,
    mass: f64,
}

/// Metabolic breakdown of one muscle at one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleEnergetics {
    pub name: String,
    /// Muscle mass (kg)
    pub mass: f64,
    /// Terms after enable-flag masking, before clamping
    pub terms: EnergeticsTerms,
    /// `Adot + Mdot + Sdot` after clamping
    pub heat_rate: f64,
    /// Whether the minimum heat rate was applied
    pub clamped: bool,
    /// `heat_rate + Wdot`
    pub total: f64,
}

/// Full metabolic breakdown of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetabolicReport {
    pub probe: String,
    /// Per-muscle breakdown in parameter-set order
    pub muscles: Vec<MuscleEnergetics>,
    /// Whole-body basal rate (0 when disabled)
    pub basal: f64,
    /// Grand total (W)
    pub total: f64,
}

impl MetabolicReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Computes the net metabolic power of a set of muscles
#[derive(Clone)]
pub struct MetabolicPowerProbe {
    name: String,
    flags: TermFlags,
    basal_coefficient: f64,
    basal_exponent: f64,
    shortening_model: ShorteningHeatModel,
    curve: Arc<dyn InterpolationCurve>,
    parameters: MetabolicMuscleParameterSet,
    bindings: Option<Vec<BoundMuscle>>,
}

impl fmt::Debug for MetabolicPowerProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetabolicPowerProbe")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("basal_coefficient", &self.basal_coefficient)
            .field("basal_exponent", &self.basal_exponent)
            .field("shortening_model", &self.shortening_model)
            .field("muscles", &self.parameters.len())
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl Default for MetabolicPowerProbe {
    fn default() -> Self {
        Self::new(probe::DEFAULT_PROBE_NAME)
    }
}

impl MetabolicPowerProbe {
    /// Probe with every term enabled, default basal constants, the default
    /// maintenance curve and no muscles.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: TermFlags::default(),
            basal_coefficient: probe::DEFAULT_BASAL_COEFFICIENT,
            basal_exponent: probe::DEFAULT_BASAL_EXPONENT,
            shortening_model: ShorteningHeatModel::default(),
            curve: Arc::new(PiecewiseLinearCurve::default()),
            parameters: MetabolicMuscleParameterSet::new(),
            bindings: None,
        }
    }

    /// Probe with explicit rate switches. The minimum heat rate stays enforced.
    pub fn with_rates(
        name: impl Into<String>,
        activation_rate_on: bool,
        maintenance_rate_on: bool,
        shortening_rate_on: bool,
        basal_rate_on: bool,
        mechanical_work_rate_on: bool,
    ) -> Self {
        let mut probe = Self::new(name);
        probe.flags = TermFlags {
            activation_rate_on,
            maintenance_rate_on,
            shortening_rate_on,
            basal_rate_on,
            mechanical_work_rate_on,
            enforce_minimum_heat_rate_per_muscle: true,
        };
        probe
    }

    /// Build a probe from a loaded configuration.
    ///
    /// Every parameter entry is validated here; binding still has to follow.
    pub fn from_config(config: ProbeConfig) -> ProbeResult<Self> {
        if !config.basal_coefficient.is_finite() || !config.basal_exponent.is_finite() {
            return Err(ProbeError::configuration(
                &config.name,
                "basal_coefficient and basal_exponent must be finite",
            ));
        }
        config.metabolic_parameters.validate()?;

        let shortening_model = config.shortening_heat_model();
        Ok(Self {
            name: config.name,
            flags: config.flags,
            basal_coefficient: config.basal_coefficient,
            basal_exponent: config.basal_exponent,
            shortening_model,
            curve: Arc::new(config.normalized_fiber_length_dependence_on_maintenance_rate),
            parameters: config.metabolic_parameters,
            bindings: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> TermFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: TermFlags) {
        self.flags = flags;
    }

    pub fn basal_coefficient(&self) -> f64 {
        self.basal_coefficient
    }

    pub fn basal_exponent(&self) -> f64 {
        self.basal_exponent
    }

    pub fn set_basal(&mut self, coefficient: f64, exponent: f64) {
        self.basal_coefficient = coefficient;
        self.basal_exponent = exponent;
    }

    pub fn shortening_model(&self) -> ShorteningHeatModel {
        self.shortening_model
    }

    pub fn set_shortening_model(&mut self, model: ShorteningHeatModel) {
        self.shortening_model = model;
    }

    /// Replace the maintenance-rate length dependence. Drops the binding.
    pub fn set_curve(&mut self, curve: Arc<dyn InterpolationCurve>) {
        self.curve = curve;
        self.unbind();
    }

    pub fn parameters(&self) -> &MetabolicMuscleParameterSet {
        &self.parameters
    }

    /// Append a parameter entry. Drops the binding.
    pub fn add_parameter(&mut self, parameter: MetabolicMuscleParameter) -> ProbeResult<()> {
        parameter.validate()?;
        self.parameters.add(parameter)?;
        self.unbind();
        Ok(())
    }

    /// Insert or overwrite a parameter entry by name. Drops the binding.
    pub fn replace_parameter(
        &mut self,
        parameter: MetabolicMuscleParameter,
    ) -> ProbeResult<Option<MetabolicMuscleParameter>> {
        parameter.validate()?;
        let previous = self.parameters.replace(parameter);
        self.unbind();
        Ok(previous)
    }

    /// Remove a parameter entry by name. Drops the binding.
    pub fn remove_parameter(&mut self, name: &str) -> Option<MetabolicMuscleParameter> {
        let removed = self.parameters.remove(name);
        self.unbind();
        removed
    }

    pub fn is_bound(&self) -> bool {
        self.bindings.is_some()
    }

    fn unbind(&mut self) {
        self.bindings = None;
        for param in self.parameters.iter_mut() {
            param.clear_muscle_mass();
        }
    }

    /// Resolve every parameter entry against `model` and cache muscle masses.
    ///
    /// All-or-nothing: on error the previous binding is dropped and no
    /// partial binding is kept. Rebinding an unchanged model reproduces the
    /// same masses.
    pub fn bind<M: MusculoskeletalModel + ?Sized>(&mut self, model: &M) -> ProbeResult<()> {
        self.unbind();

        let mut resolved = Vec::with_capacity(self.parameters.len());
        for param in self.parameters.iter() {
            let model_index = model
                .muscle_index(&param.name)
                .ok_or_else(|| ProbeError::unresolved_muscle(&self.name, &param.name))?;

            let properties = model.muscle_properties(model_index);
            let mass = param.resolve_mass(
                properties.max_isometric_force,
                properties.optimal_fiber_length,
            )?;

            if !mass.is_finite() || mass <= 0.0 {
                return Err(ProbeError::configuration(
                    &param.name,
                    format!("resolved muscle mass must be finite and positive, got {}", mass),
                ));
            }

            debug!(
                probe = %self.name,
                muscle = %param.name,
                mass,
                provided = param.use_provided_muscle_mass,
                "resolved muscle mass"
            );
            resolved.push(BoundMuscle { model_index, mass });
        }

        for (param, bound) in self.parameters.iter_mut().zip(&resolved) {
            param.set_muscle_mass(bound.mass);
        }
        self.bindings = Some(resolved);

        info!(probe = %self.name, muscles = self.parameters.len(), "metabolic probe bound");
        Ok(())
    }

    fn bindings(&self) -> ProbeResult<&[BoundMuscle]> {
        self.bindings
            .as_deref()
            .ok_or_else(|| ProbeError::NotBound {
                probe: self.name.clone(),
            })
    }

    /// Whole-body basal rate `Bdot` (W), or 0 when disabled.
    pub fn basal_rate(&self, body_mass: f64) -> f64 {
        if self.flags.basal_rate_on {
            self.basal_coefficient * body_mass.powf(self.basal_exponent)
        } else {
            0.0
        }
    }

    fn mask(&self, terms: EnergeticsTerms) -> EnergeticsTerms {
        let keep = |on: bool, value: f64| if on { value } else { 0.0 };
        EnergeticsTerms {
            activation: keep(self.flags.activation_rate_on, terms.activation),
            maintenance: keep(self.flags.maintenance_rate_on, terms.maintenance),
            shortening: keep(self.flags.shortening_rate_on, terms.shortening),
            mechanical_work: keep(self.flags.mechanical_work_rate_on, terms.mechanical_work),
        }
    }

    fn muscle_energetics<S: SimulationState + ?Sized>(
        &self,
        param: &MetabolicMuscleParameter,
        bound: &BoundMuscle,
        state: &S,
    ) -> ProbeResult<MuscleEnergetics> {
        let dynamic_state = self.bound_state(param, bound, state)?;
        let terms = self.mask(compute_terms(
            param,
            bound.mass,
            &dynamic_state,
            self.curve.as_ref(),
            self.shortening_model,
        ));

        let raw_heat = terms.heat_rate();
        let floor = probe::MINIMUM_HEAT_RATE_PER_KG * bound.mass;
        let clamped = self.flags.clamps_heat_rate() && raw_heat < floor;
        let heat_rate = if clamped { floor } else { raw_heat };
        let total = heat_rate + terms.mechanical_work;

        trace!(muscle = %param.name, heat_rate, clamped, total, "muscle metabolic rate");

        Ok(MuscleEnergetics {
            name: param.name.clone(),
            mass: bound.mass,
            terms,
            heat_rate,
            clamped,
            total,
        })
    }

    /// State of a bound muscle, checked against the name resolved at bind time.
    fn bound_state<S: SimulationState + ?Sized>(
        &self,
        param: &MetabolicMuscleParameter,
        bound: &BoundMuscle,
        state: &S,
    ) -> ProbeResult<MuscleDynamicState> {
        let mismatch = |found: String| ProbeError::StateMismatch {
            probe: self.name.clone(),
            muscle: param.name.clone(),
            index: bound.model_index,
            found,
        };

        match state.muscle_name(bound.model_index) {
            Some(name) if name == param.name => state
                .muscle_state(bound.model_index)
                .ok_or_else(|| mismatch("no state".to_string())),
            Some(name) => Err(mismatch(format!("'{}'", name))),
            None => Err(mismatch("no muscle".to_string())),
        }
    }

    /// Total metabolic power (W) at the given state.
    pub fn evaluate<S: SimulationState + ?Sized>(&self, state: &S) -> ProbeResult<f64> {
        let bindings = self.bindings()?;

        let muscles: f64 = self
            .parameters
            .iter()
            .zip(bindings)
            .map(|(param, bound)| Ok(self.muscle_energetics(param, bound, state)?.total))
            .sum::<ProbeResult<f64>>()?;

        let total = muscles + self.basal_rate(state.total_mass());
        trace!(probe = %self.name, total, "metabolic power");
        Ok(total)
    }

    /// Per-muscle breakdown of the same quantity [`evaluate`](Self::evaluate) returns.
    pub fn evaluate_detailed<S: SimulationState + ?Sized>(&self, state: &S) -> ProbeResult<MetabolicReport> {
        let bindings = self.bindings()?;

        let muscles: Vec<MuscleEnergetics> = self
            .parameters
            .iter()
            .zip(bindings)
            .map(|(param, bound)| self.muscle_energetics(param, bound, state))
            .collect::<ProbeResult<_>>()?;

        let basal = self.basal_rate(state.total_mass());
        let total = muscles.iter().map(|m| m.total).sum::<f64>() + basal;

        Ok(MetabolicReport {
            probe: self.name.clone(),
            muscles,
            basal,
            total,
        })
    }

    /// Evaluate independent trial states in parallel.
    ///
    /// Each state must lay out the bound muscles at the indices resolved by
    /// [`bind`](Self::bind); a state that does not yields `StateMismatch`.
    pub fn evaluate_batch<S: SimulationState + Sync>(&self, states: &[S]) -> Vec<ProbeResult<f64>> {
        states.par_iter().map(|state| self.evaluate(state)).collect()
    }

    /// Probe values for reporting; always [`num_outputs`](Self::num_outputs) long.
    pub fn compute_probe_inputs<S: SimulationState + ?Sized>(&self, state: &S) -> ProbeResult<Vec<f64>> {
        Ok(vec![self.evaluate(state)?])
    }

    pub fn num_outputs(&self) -> usize {
        probe::NUM_OUTPUTS
    }

    /// Column labels for reporting: the probe name.
    pub fn output_labels(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}
