// src/parameter_set.rs
//! Ordered, name-keyed collection of metabolic parameters
//!
//! Insertion order is evaluation order. Names are unique; the set serializes
//! as a plain list and rejects duplicate names when deserialized.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, ProbeResult};
use crate::parameter::MetabolicMuscleParameter;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MetabolicMuscleParameter>", into = "Vec<MetabolicMuscleParameter>")]
pub struct MetabolicMuscleParameterSet {
    entries: Vec<MetabolicMuscleParameter>,
    index: HashMap<String, usize>,
}

impl MetabolicMuscleParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Fails if an entry with the same name exists.
    pub fn add(&mut self, parameter: MetabolicMuscleParameter) -> ProbeResult<()> {
        if self.index.contains_key(&parameter.name) {
            return Err(ProbeError::DuplicateParameter {
                name: parameter.name,
            });
        }

        self.index.insert(parameter.name.clone(), self.entries.len());
        self.entries.push(parameter);
        Ok(())
    }

    /// Insert or overwrite by name, returning the previous entry if any.
    ///
    /// An overwritten entry keeps its position in the evaluation order.
    pub fn replace(&mut self, parameter: MetabolicMuscleParameter) -> Option<MetabolicMuscleParameter> {
        match self.index.get(&parameter.name) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i], parameter)),
            None => {
                self.index.insert(parameter.name.clone(), self.entries.len());
                self.entries.push(parameter);
                None
            }
        }
    }

    /// Remove an entry by name, shifting later entries up.
    pub fn remove(&mut self, name: &str) -> Option<MetabolicMuscleParameter> {
        let i = self.index.remove(name)?;
        let removed = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn get(&self, name: &str) -> Option<&MetabolicMuscleParameter> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MetabolicMuscleParameter> {
        match self.index.get(name) {
            Some(&i) => self.entries.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &MetabolicMuscleParameter> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut MetabolicMuscleParameter> {
        self.entries.iter_mut()
    }

    /// Muscle names in evaluation order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|p| p.name.as_str())
    }

    /// Validate every entry, stopping at the first violation.
    pub fn validate(&self) -> ProbeResult<()> {
        self.entries.iter().try_for_each(MetabolicMuscleParameter::validate)
    }
}

impl TryFrom<Vec<MetabolicMuscleParameter>> for MetabolicMuscleParameterSet {
    type Error = ProbeError;

    fn try_from(parameters: Vec<MetabolicMuscleParameter>) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        for parameter in parameters {
            set.add(parameter)?;
        }
        Ok(set)
    }
}

impl From<MetabolicMuscleParameterSet> for Vec<MetabolicMuscleParameter> {
    fn from(set: MetabolicMuscleParameterSet) -> Self {
        set.entries
    }
}

impl<'a> IntoIterator for &'a MetabolicMuscleParameterSet {
    type Item = &'a MetabolicMuscleParameter;
    type IntoIter = std::slice::Iter<'a, MetabolicMuscleParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
