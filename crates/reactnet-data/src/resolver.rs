//! Unit-aware value resolution for gas mixtures.
//!
//! Turns a validated gas-status or inlet dictionary into one or more
//! [`GasState`]s in canonical units: temperature in K, pressure in Pa,
//! composition as mass fractions ordered like the thermodynamic model.
//! Exactly two of temperature, pressure and density are given; the missing
//! one is back-solved from the ideal-gas law `P = rho R T / MW`.

use crate::grammars::{COMPOSITION, FUEL, OXIDIZER, STATE};
use reactnet_core::error::ConfigError;
use reactnet_core::id::{SpeciesIndex, StreamId};
use reactnet_core::thermo::{Thermodynamics, R_J_KMOL};
use reactnet_core::units::Quantity;
use reactnet_core::RawDictionary;
use serde::Serialize;
use tracing::debug;

/// Allowed deviation from 1 for fraction-typed compositions.
pub const FRACTION_TOLERANCE: f64 = 1e-6;

/// A fully resolved mixture state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GasState {
    /// K
    pub temperature: f64,
    /// Pa
    pub pressure: f64,
    pub mass_fractions: Vec<f64>,
}

/// How the values of a composition keyword are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionBasis {
    MoleFractions,
    MassFractions,
    Moles,
    Masses,
}

impl CompositionBasis {
    /// In the order used by the keyword tables of [`crate::grammars`].
    pub const ALL: [CompositionBasis; 4] = [
        CompositionBasis::MoleFractions,
        CompositionBasis::MassFractions,
        CompositionBasis::Moles,
        CompositionBasis::Masses,
    ];

    /// Fractions must already sum to one; absolute amounts are normalized.
    pub fn is_fraction(self) -> bool {
        matches!(
            self,
            CompositionBasis::MoleFractions | CompositionBasis::MassFractions
        )
    }

    pub fn is_molar(self) -> bool {
        matches!(self, CompositionBasis::MoleFractions | CompositionBasis::Moles)
    }
}

// ===========================================================================
// Scalar values
// ===========================================================================

/// Read a single-string keyword that must be one of `choices`.
pub fn choice<T: Copy>(
    dict: &RawDictionary,
    key: &str,
    choices: &[(&str, T)],
) -> Result<T, ConfigError> {
    let value = dict.read_string(key)?;
    choices
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, choice)| *choice)
        .ok_or_else(|| {
            let accepted: Vec<&str> = choices.iter().map(|(name, _)| *name).collect();
            ConfigError::invalid(
                key,
                value,
                &format!("expected one of {}", accepted.join(", ")),
                dict.name(),
            )
        })
}

/// A non-negative integer stream ID.
pub fn to_stream(value: i64, key: &str, block: &str) -> Result<StreamId, ConfigError> {
    StreamId::try_from(value)
        .map_err(|_| ConfigError::invalid(key, value, "stream IDs must be non-negative", block))
}

pub fn stream(dict: &RawDictionary, key: &str) -> Result<StreamId, ConfigError> {
    to_stream(dict.read_int(key)?, key, dict.name())
}

pub fn streams(dict: &RawDictionary, key: &str) -> Result<Vec<StreamId>, ConfigError> {
    dict.read_ints(key)?
        .into_iter()
        .map(|value| to_stream(value, key, dict.name()))
        .collect()
}

/// Read a `value unit` keyword and convert it to the canonical unit of `quantity`.
pub fn measure(dict: &RawDictionary, key: &str, quantity: Quantity) -> Result<f64, ConfigError> {
    let (value, unit) = dict.read_measure(key)?;
    quantity
        .to_canonical(value, unit)
        .map_err(|e| ConfigError::unit(e, dict.name()))
}

/// Like [`measure`], but `None` when the keyword is absent.
pub fn optional_measure(
    dict: &RawDictionary,
    key: &str,
    quantity: Quantity,
) -> Result<Option<f64>, ConfigError> {
    if dict.exists(key) {
        measure(dict, key, quantity).map(Some)
    } else {
        Ok(None)
    }
}

/// Like [`measure`], but the canonical value must be strictly positive.
pub fn positive_measure(
    dict: &RawDictionary,
    key: &str,
    quantity: Quantity,
) -> Result<f64, ConfigError> {
    let value = measure(dict, key, quantity)?;
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::invalid(key, value, "must be positive", dict.name()))
    }
}

// ===========================================================================
// Composition
// ===========================================================================

/// Read `key` as `name value` pairs and return them normalized to sum to one,
/// on the keyword's own basis (mole or mass), indexed like the species model.
pub fn normalized_fractions(
    dict: &RawDictionary,
    key: &str,
    basis: CompositionBasis,
    thermo: &impl Thermodynamics,
) -> Result<Vec<f64>, ConfigError> {
    let block = dict.name();
    let pairs = dict.read_named_doubles(key)?;
    let mut values = vec![0.0; thermo.number_of_species()];
    let mut seen = vec![false; values.len()];

    for (name, value) in &pairs {
        let index = thermo
            .index_of_species(name)
            .ok_or_else(|| ConfigError::UnknownSpeciesName {
                name: name.clone(),
                block: block.to_string(),
            })?;
        if seen[index.0] {
            return Err(ConfigError::invalid(key, name, "species listed more than once", block));
        }
        if *value < 0.0 {
            return Err(ConfigError::invalid(key, value, "amounts must be non-negative", block));
        }
        seen[index.0] = true;
        values[index.0] = *value;
    }

    let sum: f64 = values.iter().sum();
    if basis.is_fraction() && (sum - 1.0).abs() > FRACTION_TOLERANCE {
        return Err(ConfigError::CompositionNotNormalized {
            sum,
            block: block.to_string(),
        });
    }
    if !(sum > 0.0 && sum.is_finite()) {
        return Err(ConfigError::invalid(key, sum, "total amount must be positive and finite", block));
    }
    values.iter_mut().for_each(|v| *v /= sum);
    Ok(values)
}

/// Resolve a composition keyword into mass fractions.
pub fn resolve_composition(
    dict: &RawDictionary,
    key: &str,
    basis: CompositionBasis,
    thermo: &impl Thermodynamics,
) -> Result<Vec<f64>, ConfigError> {
    let fractions = normalized_fractions(dict, key, basis, thermo)?;
    if basis.is_molar() {
        Ok(thermo.mass_fractions_from_mole_fractions(&fractions).0)
    } else {
        Ok(fractions)
    }
}

/// Mole fractions of a composition keyword, whatever its basis.
fn resolve_mole_fractions(
    dict: &RawDictionary,
    key: &str,
    basis: CompositionBasis,
    thermo: &impl Thermodynamics,
) -> Result<Vec<f64>, ConfigError> {
    let fractions = normalized_fractions(dict, key, basis, thermo)?;
    if basis.is_molar() {
        Ok(fractions)
    } else {
        Ok(thermo.mole_fractions_from_mass_fractions(&fractions).0)
    }
}

/// The first present keyword of `candidates`, with its basis.
fn present_source<'a>(
    dict: &RawDictionary,
    candidates: &[&'a str],
) -> Option<(&'a str, CompositionBasis)> {
    candidates
        .iter()
        .zip(CompositionBasis::ALL)
        .find(|(key, _)| dict.exists(key))
        .map(|(key, basis)| (*key, basis))
}

fn missing_group(dict: &RawDictionary, group: &str, required: usize) -> ConfigError {
    ConfigError::UnderSpecified {
        group: group.to_string(),
        required,
        found: 0,
        block: dict.name().to_string(),
    }
}

/// Moles of O2 a mixture needs for complete oxidation (negative if it supplies O2).
fn oxygen_demand(mole_fractions: &[f64], thermo: &impl Thermodynamics) -> f64 {
    mole_fractions
        .iter()
        .enumerate()
        .map(|(i, x)| x * thermo.oxygen_demand(SpeciesIndex(i)))
        .sum()
}

/// One mass-fraction vector per equivalence ratio.
///
/// For a ratio `phi`, `n` moles of oxidizer are mixed with one mole of fuel,
/// where `n = demand(fuel) / (phi * supply(oxidizer))`.
pub fn equivalence_ratio_compositions(
    dict: &RawDictionary,
    thermo: &impl Thermodynamics,
) -> Result<Vec<Vec<f64>>, ConfigError> {
    let block = dict.name();
    let ratios = dict.read_doubles("@EquivalenceRatio")?;
    let (fuel_key, fuel_basis) =
        present_source(dict, &FUEL).ok_or_else(|| missing_group(dict, "fuel", 1))?;
    let (ox_key, ox_basis) =
        present_source(dict, &OXIDIZER).ok_or_else(|| missing_group(dict, "oxidizer", 1))?;

    let fuel = resolve_mole_fractions(dict, fuel_key, fuel_basis, thermo)?;
    let oxidizer = resolve_mole_fractions(dict, ox_key, ox_basis, thermo)?;

    let demand = oxygen_demand(&fuel, thermo);
    if demand <= 0.0 {
        return Err(ConfigError::invalid(fuel_key, demand, "fuel has no oxygen demand", block));
    }
    let supply = -oxygen_demand(&oxidizer, thermo);
    if supply <= 0.0 {
        return Err(ConfigError::invalid(ox_key, supply, "oxidizer supplies no oxygen", block));
    }

    ratios
        .iter()
        .map(|&phi| {
            if phi <= 0.0 {
                return Err(ConfigError::invalid(
                    "@EquivalenceRatio",
                    phi,
                    "must be positive",
                    block,
                ));
            }
            let n = demand / (phi * supply);
            let mixture: Vec<f64> = fuel
                .iter()
                .zip(&oxidizer)
                .map(|(f, o)| (f + n * o) / (1.0 + n))
                .collect();
            Ok(thermo.mass_fractions_from_mole_fractions(&mixture).0)
        })
        .collect()
}

/// Every composition the block describes: one for a plain composition
/// keyword, one per ratio for `@EquivalenceRatio`.
pub fn resolve_compositions(
    dict: &RawDictionary,
    thermo: &impl Thermodynamics,
) -> Result<Vec<Vec<f64>>, ConfigError> {
    if dict.exists("@EquivalenceRatio") {
        return equivalence_ratio_compositions(dict, thermo);
    }
    let (key, basis) = present_source(dict, &COMPOSITION[..4])
        .ok_or_else(|| missing_group(dict, "composition", 1))?;
    Ok(vec![resolve_composition(dict, key, basis, thermo)?])
}

// ===========================================================================
// Thermodynamic state
// ===========================================================================

/// Mixture molecular weight for a density back-solve; needs a single composition.
fn single_molecular_weight(
    compositions: &[Vec<f64>],
    density: f64,
    block: &str,
    thermo: &impl Thermodynamics,
) -> Result<f64, ConfigError> {
    match compositions {
        [single] => Ok(thermo.molecular_weight_from_mass_fractions(single)),
        _ => Err(ConfigError::invalid(
            "@Density",
            density,
            "cannot be combined with more than one equivalence ratio",
            block,
        )),
    }
}

/// Resolve the gas states of a block.
///
/// Returns one state per composition. Temperature and pressure are shared by
/// all states; density may only be used when there is a single composition.
pub fn resolve_gas_states(
    dict: &RawDictionary,
    thermo: &impl Thermodynamics,
) -> Result<Vec<GasState>, ConfigError> {
    let block = dict.name();
    let temperature = optional_measure(dict, STATE[0], Quantity::Temperature)?;
    let pressure = optional_measure(dict, STATE[1], Quantity::Pressure)?;
    let density = optional_measure(dict, STATE[2], Quantity::Density)?;

    for (key, value) in STATE.iter().zip([temperature, pressure, density]) {
        if let Some(v) = value {
            if !(v > 0.0 && v.is_finite()) {
                return Err(ConfigError::invalid(key, v, "must be positive", block));
            }
        }
    }

    let compositions = resolve_compositions(dict, thermo)?;

    let (temperature, pressure) = match (temperature, pressure, density) {
        (Some(t), Some(p), None) => (t, p),
        (Some(t), None, Some(rho)) => {
            let mw = single_molecular_weight(&compositions, rho, block, thermo)?;
            let p = rho * R_J_KMOL * t / mw;
            debug!(block, pressure = p, "pressure from ideal-gas law");
            (t, p)
        }
        (None, Some(p), Some(rho)) => {
            let mw = single_molecular_weight(&compositions, rho, block, thermo)?;
            let t = p * mw / (R_J_KMOL * rho);
            debug!(block, temperature = t, "temperature from ideal-gas law");
            (t, p)
        }
        (t, p, rho) => {
            let found = [t, p, rho].iter().filter(|v| v.is_some()).count();
            return Err(if found < 2 {
                ConfigError::UnderSpecified {
                    group: "state".to_string(),
                    required: 2,
                    found,
                    block: block.to_string(),
                }
            } else {
                ConfigError::OverSpecified {
                    group: "state".to_string(),
                    allowed: 2,
                    found,
                    block: block.to_string(),
                }
            });
        }
    };

    Ok(compositions
        .into_iter()
        .map(|mass_fractions| GasState {
            temperature,
            pressure,
            mass_fractions,
        })
        .collect())
}
