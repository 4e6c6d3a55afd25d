// src/model.rs
//! Interfaces consumed from the host dynamics engine
//!
//! The probe never advances time or touches engine state. It needs two views
//! of the model:
//!
//! - [`MusculoskeletalModel`] at bind time, to resolve muscle names to
//!   indices and read the architecture used for mass derivation;
//! - [`SimulationState`] at every evaluation, to read each bound muscle's
//!   dynamic state and the whole-body mass.
//!
//! [`InMemoryModel`] implements both over a flat table of named muscles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Architecture of a muscle, read once at bind time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MuscleProperties {
    /// Maximum isometric force (N)
    pub max_isometric_force: f64,
    /// Optimal fiber length (m)
    pub optimal_fiber_length: f64,
}

/// Dynamic state of one muscle at a single evaluation point.
///
/// Fiber velocity is positive when the fiber lengthens (eccentric) and
/// negative when it shortens (concentric).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MuscleDynamicState {
    /// Neural excitation, in [0, 1]
    pub excitation: f64,
    /// Activation, in [0, 1]
    pub activation: f64,
    /// Fiber length divided by optimal fiber length
    pub normalized_fiber_length: f64,
    /// Fiber velocity (m/s)
    pub fiber_velocity: f64,
    /// Force developed by the contractile element (N)
    pub active_fiber_force: f64,
    /// Contractile force under isometric conditions at the current
    /// activation and fiber length (N)
    pub isometric_active_fiber_force: f64,
    /// Passive fiber force (N)
    pub passive_fiber_force: f64,
}

/// Bind-time view of the model
pub trait MusculoskeletalModel {
    /// Index of the named muscle, or `None` if the model has no such muscle.
    fn muscle_index(&self, name: &str) -> Option<usize>;

    /// Architecture of the muscle at `index`.
    fn muscle_properties(&self, index: usize) -> MuscleProperties;
}

/// Evaluation-time view of the model
///
/// Indices are the ones resolved at bind time. An implementation returns
/// `None` for an index it does not have, and reports the muscle name at each
/// index so a caller can detect a state laid out differently from the bound
/// model.
pub trait SimulationState {
    /// Name of the muscle at `index`.
    fn muscle_name(&self, index: usize) -> Option<&str>;

    /// Dynamic state of the muscle at `index` (as returned by
    /// [`MusculoskeletalModel::muscle_index`]).
    fn muscle_state(&self, index: usize) -> Option<MuscleDynamicState>;

    /// Total mass of the model (kg).
    fn total_mass(&self) -> f64;
}

/// One row of an [`InMemoryModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleRecord {
    pub name: String,
    pub properties: MuscleProperties,
    #[serde(default)]
    pub state: MuscleDynamicState,
}

/// Named muscles with their architecture and current state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "InMemoryModelRecord", into = "InMemoryModelRecord")]
pub struct InMemoryModel {
    total_mass: f64,
    muscles: Vec<MuscleRecord>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InMemoryModelRecord {
    total_mass: f64,
    #[serde(default)]
    muscles: Vec<MuscleRecord>,
}

impl From<InMemoryModelRecord> for InMemoryModel {
    fn from(record: InMemoryModelRecord) -> Self {
        let mut model = InMemoryModel::new(record.total_mass);
        for muscle in record.muscles {
            model.insert(muscle);
        }
        model
    }
}

impl From<InMemoryModel> for InMemoryModelRecord {
    fn from(model: InMemoryModel) -> Self {
        Self {
            total_mass: model.total_mass,
            muscles: model.muscles,
        }
    }
}

impl InMemoryModel {
    pub fn new(total_mass: f64) -> Self {
        Self {
            total_mass,
            ..Default::default()
        }
    }

    /// Add a muscle, builder style.
    pub fn with_muscle(
        mut self,
        name: impl Into<String>,
        max_isometric_force: f64,
        optimal_fiber_length: f64,
    ) -> Self {
        self.insert(MuscleRecord {
            name: name.into(),
            properties: MuscleProperties {
                max_isometric_force,
                optimal_fiber_length,
            },
            state: MuscleDynamicState::default(),
        });
        self
    }

    /// Insert or overwrite a muscle by name.
    pub fn insert(&mut self, record: MuscleRecord) {
        match self.index.get(&record.name) {
            Some(&i) => self.muscles[i] = record,
            None => {
                self.index.insert(record.name.clone(), self.muscles.len());
                self.muscles.push(record);
            }
        }
    }

    /// Update the dynamic state of a named muscle. Returns false if absent.
    pub fn set_state(&mut self, name: &str, state: MuscleDynamicState) -> bool {
        match self.index.get(name) {
            Some(&i) => {
                self.muscles[i].state = state;
                true
            }
            None => false,
        }
    }

    pub fn state(&self, name: &str) -> Option<&MuscleDynamicState> {
        self.index.get(name).map(|&i| &self.muscles[i].state)
    }

    pub fn set_total_mass(&mut self, total_mass: f64) {
        self.total_mass = total_mass;
    }

    pub fn len(&self) -> usize {
        self.muscles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.muscles.is_empty()
    }

    pub fn muscles(&self) -> &[MuscleRecord] {
        &self.muscles
    }
}

impl MusculoskeletalModel for InMemoryModel {
    fn muscle_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn muscle_properties(&self, index: usize) -> MuscleProperties {
        self.muscles[index].properties
    }
}

impl SimulationState for InMemoryModel {
    fn muscle_name(&self, index: usize) -> Option<&str> {
        self.muscles.get(index).map(|m| m.name.as_str())
    }

    fn muscle_state(&self, index: usize) -> Option<MuscleDynamicState> {
        self.muscles.get(index).map(|m| m.state)
    }

    fn total_mass(&self) -> f64 {
        self.total_mass
    }
}
