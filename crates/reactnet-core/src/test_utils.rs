//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::dictionary::RawDictionary;
use crate::grammar::{Grammar, GrammarBuilder, KeywordGroup, KeywordRule, ValueShape};
use crate::thermo::{Species, SpeciesTable};

pub const STATE_KEYWORDS: [&str; 3] = ["@Temperature", "@Pressure", "@Density"];
pub const COMPOSITION_KEYWORDS: [&str; 4] = ["@MoleFractions", "@MassFractions", "@Moles", "@Masses"];

// ===========================================================================
// Species tables
// ===========================================================================

/// Methane/air species set with elemental compositions.
pub fn methane_air() -> SpeciesTable {
    let mut table = SpeciesTable::new();
    for species in [
        Species::new("CH4", 16.043).atoms(1, 4, 0, 0),
        Species::new("O2", 31.998).atoms(0, 0, 2, 0),
        Species::new("N2", 28.014).atoms(0, 0, 0, 2),
        Species::new("H2", 2.016).atoms(0, 2, 0, 0),
        Species::new("H2O", 18.015).atoms(0, 2, 1, 0),
        Species::new("CO2", 44.009).atoms(1, 0, 2, 0),
    ] {
        table.add(species).expect("distinct species");
    }
    table
}

/// A single pseudo-species with a molecular weight of exactly 29 kg/kmol.
pub fn pseudo_air() -> SpeciesTable {
    let mut table = SpeciesTable::new();
    table.add(Species::new("AIR", 29.0)).expect("valid species");
    table
}

// ===========================================================================
// Grammars
// ===========================================================================

/// A minimal gas-state grammar: exactly 2 of T/P/rho and exactly 1
/// composition source.
pub fn state_grammar() -> Grammar {
    let mut b = GrammarBuilder::new("gas status");
    for name in STATE_KEYWORDS {
        b.define(KeywordRule::new(name, ValueShape::Measure, name))
            .expect("state keyword");
    }
    for name in COMPOSITION_KEYWORDS {
        b.define(KeywordRule::new(name, ValueShape::NamedDoubles, name))
            .expect("composition keyword");
    }
    b.group(KeywordGroup::exactly("state", 2, &STATE_KEYWORDS))
        .expect("state group");
    b.group(KeywordGroup::exactly("composition", 1, &COMPOSITION_KEYWORDS))
        .expect("composition group");
    b.build().expect("state grammar")
}

// ===========================================================================
// Dictionary constructors
// ===========================================================================

/// Build a dictionary from `(keyword, value)` pairs; values split on whitespace.
pub fn dict(name: &str, entries: &[(&str, &str)]) -> RawDictionary {
    entries
        .iter()
        .fold(RawDictionary::new(name), |d, (key, value)| d.with(key, value))
}

/// Relative closeness check for floating-point results.
pub fn approx(a: f64, b: f64, rel: f64) -> bool {
    (a - b).abs() <= rel * b.abs().max(1e-300)
}
