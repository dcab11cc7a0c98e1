//! Property-based tests for composition and state resolution.
//!
//! Generates random mixtures over the methane/air species set and checks
//! normalization, back-solve and cardinality invariants through the full
//! grammar + resolver pipeline.

use proptest::prelude::*;
use reactnet_core::error::ConfigError;
use reactnet_core::test_utils::methane_air;
use reactnet_core::thermo::R_J_KMOL;
use reactnet_core::{RawDictionary, Thermodynamics};
use reactnet_data::builder::gas_status;
use reactnet_data::grammars::grammars;

const SPECIES: [&str; 6] = ["CH4", "O2", "N2", "H2", "H2O", "CO2"];

// ===========================================================================
// Generators
// ===========================================================================

/// Positive amounts for a non-empty subset of the species.
fn arb_amounts() -> impl Strategy<Value = Vec<(&'static str, f64)>> {
    proptest::sample::subsequence(SPECIES.to_vec(), 1..=SPECIES.len()).prop_flat_map(|names| {
        let n = names.len();
        proptest::collection::vec(0.01..100.0f64, n)
            .prop_map(move |values| names.iter().copied().zip(values).collect())
    })
}

fn composition(amounts: &[(&str, f64)]) -> String {
    amounts
        .iter()
        .map(|(name, value)| format!("{name} {value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn state_dict(key: &str, amounts: &[(&str, f64)]) -> RawDictionary {
    RawDictionary::new("feed")
        .with("@Temperature", "300 K")
        .with("@Pressure", "1 atm")
        .with(key, &composition(amounts))
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn absolute_amounts_always_normalize(amounts in arb_amounts(), molar in any::<bool>()) {
        let key = if molar { "@Moles" } else { "@Masses" };
        let states = gas_status(&state_dict(key, &amounts), grammars().unwrap(), &methane_air()).unwrap();
        prop_assert_eq!(states.len(), 1);
        let sum: f64 = states[0].mass_fractions.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9);
        prop_assert!(states[0].mass_fractions.iter().all(|w| *w >= 0.0));
    }

    #[test]
    fn fractions_accepted_only_when_normalized(amounts in arb_amounts(), scale in 0.5..1.5f64) {
        let total: f64 = amounts.iter().map(|(_, v)| v).sum();
        let scaled: Vec<(&str, f64)> = amounts
            .iter()
            .map(|(name, v)| (*name, v / total * scale))
            .collect();
        let sum: f64 = scaled.iter().map(|(_, v)| v).sum();
        let result = gas_status(
            &state_dict("@MassFractions", &scaled),
            grammars().unwrap(),
            &methane_air(),
        );
        if (sum - 1.0).abs() <= 1e-6 {
            prop_assert!(result.is_ok());
        } else {
            let rejected = matches!(result, Err(ConfigError::CompositionNotNormalized { .. }));
            prop_assert!(rejected);
        }
    }

    #[test]
    fn density_back_solve_satisfies_ideal_gas(
        amounts in arb_amounts(),
        temperature in 250.0..2500.0f64,
        density in 0.01..50.0f64,
    ) {
        let thermo = methane_air();
        let dict = RawDictionary::new("feed")
            .with("@Temperature", &format!("{temperature} K"))
            .with("@Density", &format!("{density} kg/m3"))
            .with("@Moles", &composition(&amounts));
        let states = gas_status(&dict, grammars().unwrap(), &thermo).unwrap();
        let state = &states[0];
        let mw = thermo.molecular_weight_from_mass_fractions(&state.mass_fractions);
        let expected = density * R_J_KMOL * temperature / mw;
        prop_assert!((state.pressure - expected).abs() <= 1e-9 * expected);
    }
}
