//! Property-based tests for grammar validation and unit conversion.
//!
//! Generates random subsets of the state/composition keyword groups and
//! random measures, then checks that cardinality and conversion invariants
//! hold for every input.

use proptest::prelude::*;
use reactnet_core::error::ConfigError;
use reactnet_core::test_utils::*;
use reactnet_core::units::Quantity;
use reactnet_core::validation::{validate, violations};
use reactnet_core::RawDictionary;

// ===========================================================================
// Generators
// ===========================================================================

/// A dictionary with the chosen state keywords and exactly one composition source.
fn state_dictionary(mask: [bool; 3], composition: usize) -> RawDictionary {
    let values = ["300 K", "1 atm", "1.2 kg/m3"];
    let mut dict = RawDictionary::new("feed");
    for ((name, value), present) in STATE_KEYWORDS.iter().zip(values).zip(mask) {
        if present {
            dict = dict.with(name, value);
        }
    }
    dict.with(COMPOSITION_KEYWORDS[composition], "CH4 0.3 O2 0.7")
}

fn arb_quantity() -> impl Strategy<Value = Quantity> {
    prop_oneof![
        Just(Quantity::Temperature),
        Just(Quantity::Pressure),
        Just(Quantity::Density),
        Just(Quantity::Volume),
        Just(Quantity::Length),
        Just(Quantity::Time),
        Just(Quantity::HeatTransferRate),
        Just(Quantity::ExchangeCoefficient),
        Just(Quantity::MassFlowRate),
    ]
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn state_group_requires_exactly_two(
        mask in proptest::array::uniform3(any::<bool>()),
        composition in 0..4usize,
    ) {
        let grammar = state_grammar();
        let dict = state_dictionary(mask, composition);
        let present = mask.iter().filter(|p| **p).count();
        let result = validate(&dict, &grammar);
        match present {
            2 => prop_assert!(result.is_ok()),
            3 => {
                let is_over = matches!(
                    result,
                    Err(ConfigError::OverSpecified { allowed: 2, found: 3, .. })
                );
                prop_assert!(is_over);
            }
            n => {
                let is_under = matches!(
                    result,
                    Err(ConfigError::UnderSpecified { required: 2, found, .. }) if found == n
                );
                prop_assert!(is_under);
            }
        }
    }

    #[test]
    fn composition_group_requires_exactly_one(mask in proptest::array::uniform4(any::<bool>())) {
        let grammar = state_grammar();
        let mut dict = RawDictionary::new("feed")
            .with("@Temperature", "300 K")
            .with("@Pressure", "1 bar");
        for (name, present) in COMPOSITION_KEYWORDS.iter().zip(mask) {
            if present {
                dict = dict.with(name, "N2 1");
            }
        }
        let present = mask.iter().filter(|p| **p).count();
        let errors = violations(&dict, &grammar);
        prop_assert_eq!(errors.is_empty(), present == 1);
        prop_assert!(errors.len() <= 1);
    }

    #[test]
    fn validation_is_order_independent(mask in proptest::array::uniform3(any::<bool>())) {
        let grammar = state_grammar();
        let forward = state_dictionary(mask, 0);
        let mut reversed = RawDictionary::new("feed");
        let keys: Vec<&str> = forward.keys().collect();
        for key in keys.iter().rev() {
            reversed.insert(key, forward.tokens(key).unwrap().to_vec());
        }
        prop_assert_eq!(violations(&forward, &grammar), violations(&reversed, &grammar));
    }

    #[test]
    fn conversion_is_affine(quantity in arb_quantity(), a in -1.0e6..1.0e6f64, b in -1.0e6..1.0e6f64) {
        for (unit, conversion) in quantity.table() {
            let ca = quantity.to_canonical(a, unit).unwrap();
            let cb = quantity.to_canonical(b, unit).unwrap();
            let expected = (a - b) * conversion.scale;
            prop_assert!(((ca - cb) - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn canonical_unit_is_identity(quantity in arb_quantity(), value in -1.0e9..1.0e9f64) {
        let unit = quantity.canonical_unit();
        prop_assert_eq!(quantity.to_canonical(value, unit).unwrap(), value);
    }
}
