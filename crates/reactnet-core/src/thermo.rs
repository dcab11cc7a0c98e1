//! Interface to the thermodynamic property model.
//!
//! The resolver only needs species lookup and the mole/mass fraction
//! conversions, so the model is abstracted behind [`Thermodynamics`].
//! [`SpeciesTable`] is a plain ideal-gas implementation backed by molecular
//! weights and elemental compositions.

use crate::id::SpeciesIndex;
use std::collections::HashMap;

/// Universal gas constant in J/(kmol K). Molecular weights are in kg/kmol.
pub const R_J_KMOL: f64 = 8314.47;

pub trait Thermodynamics {
    fn number_of_species(&self) -> usize;

    /// Index of a species by name, or `None` if the model does not know it.
    fn index_of_species(&self, name: &str) -> Option<SpeciesIndex>;

    /// Convert mole fractions to mass fractions. Returns `(mass_fractions, mixture_mw)`.
    fn mass_fractions_from_mole_fractions(&self, mole_fractions: &[f64]) -> (Vec<f64>, f64);

    /// Convert mass fractions to mole fractions. Returns `(mole_fractions, mixture_mw)`.
    fn mole_fractions_from_mass_fractions(&self, mass_fractions: &[f64]) -> (Vec<f64>, f64);

    fn molecular_weight_from_mass_fractions(&self, mass_fractions: &[f64]) -> f64;

    /// Moles of O2 needed to fully oxidize one mole of the species
    /// (negative for oxygen carriers such as O2 itself).
    fn oxygen_demand(&self, species: SpeciesIndex) -> f64;
}

/// A species with its molecular weight (kg/kmol) and elemental composition.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub name: String,
    pub molecular_weight: f64,
    pub carbon: u32,
    pub hydrogen: u32,
    pub oxygen: u32,
    pub nitrogen: u32,
}

impl Species {
    pub fn new(name: &str, molecular_weight: f64) -> Self {
        Self {
            name: name.to_string(),
            molecular_weight,
            carbon: 0,
            hydrogen: 0,
            oxygen: 0,
            nitrogen: 0,
        }
    }

    /// Set the C, H, O, N atom counts.
    pub fn atoms(mut self, carbon: u32, hydrogen: u32, oxygen: u32, nitrogen: u32) -> Self {
        self.carbon = carbon;
        self.hydrogen = hydrogen;
        self.oxygen = oxygen;
        self.nitrogen = nitrogen;
        self
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpeciesError {
    #[error("species '{name}' is already defined")]
    Duplicate { name: String },
    #[error("species '{name}' has invalid molecular weight {value}")]
    InvalidMolecularWeight { name: String, value: f64 },
}

/// Ideal-gas species table.
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    species: Vec<Species>,
    name_to_index: HashMap<String, SpeciesIndex>,
}

impl SpeciesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a species. Names must be unique and the molecular weight must be
    /// finite and positive.
    pub fn add(&mut self, species: Species) -> Result<SpeciesIndex, SpeciesError> {
        if self.name_to_index.contains_key(&species.name) {
            return Err(SpeciesError::Duplicate { name: species.name });
        }
        if !(species.molecular_weight > 0.0 && species.molecular_weight.is_finite()) {
            return Err(SpeciesError::InvalidMolecularWeight {
                name: species.name,
                value: species.molecular_weight,
            });
        }
        let index = SpeciesIndex(self.species.len());
        self.name_to_index.insert(species.name.clone(), index);
        self.species.push(species);
        Ok(index)
    }

    pub fn get(&self, index: SpeciesIndex) -> Option<&Species> {
        self.species.get(index.0)
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }
}

impl Thermodynamics for SpeciesTable {
    fn number_of_species(&self) -> usize {
        self.species.len()
    }

    fn index_of_species(&self, name: &str) -> Option<SpeciesIndex> {
        self.name_to_index.get(name).copied()
    }

    fn mass_fractions_from_mole_fractions(&self, mole_fractions: &[f64]) -> (Vec<f64>, f64) {
        let mw: f64 = self
            .species
            .iter()
            .zip(mole_fractions)
            .map(|(s, x)| s.molecular_weight * x)
            .sum();
        let omega = self
            .species
            .iter()
            .zip(mole_fractions)
            .map(|(s, x)| s.molecular_weight * x / mw)
            .collect();
        (omega, mw)
    }

    fn mole_fractions_from_mass_fractions(&self, mass_fractions: &[f64]) -> (Vec<f64>, f64) {
        let mw = self.molecular_weight_from_mass_fractions(mass_fractions);
        let x = self
            .species
            .iter()
            .zip(mass_fractions)
            .map(|(s, w)| w * mw / s.molecular_weight)
            .collect();
        (x, mw)
    }

    fn molecular_weight_from_mass_fractions(&self, mass_fractions: &[f64]) -> f64 {
        let inverse: f64 = self
            .species
            .iter()
            .zip(mass_fractions)
            .map(|(s, w)| w / s.molecular_weight)
            .sum();
        1.0 / inverse
    }

    fn oxygen_demand(&self, species: SpeciesIndex) -> f64 {
        self.species.get(species.0).map_or(0.0, |s| {
            s.carbon as f64 + s.hydrogen as f64 / 4.0 - s.oxygen as f64 / 2.0
        })
    }
}
