//! Aggregated error reporting for broken network files.
//!
//! A network with several independent mistakes must report all of them in
//! one pass and must not return any descriptor.

use reactnet_core::error::ConfigError;
use reactnet_core::test_utils::methane_air;
use reactnet_core::units::Quantity;
use reactnet_data::loader::parse_dictionaries;
use reactnet_data::{load_network, Format};

const BROKEN_TOML: &str = r#"
[Network]
"@KineticsFolder" = "kinetics"
"@Inlets" = ["feed", "second-feed"]
"@Reactors" = ["R1", "R2", "R3", "R4"]
"@PhaseSplitters" = ["PS1"]

# three state variables
[feed]
"@Stream" = 1
"@MassFlowRate" = "1 kg/s"
"@Temperature" = "300 K"
"@Pressure" = "1 atm"
"@Density" = "1.2 kg/m3"
"@MoleFractions" = "CH4 0.1 O2 0.2 N2 0.7"

# fractions sum to 1.1
[second-feed]
"@Stream" = 2
"@MassFlowRate" = "1 kg/s"
"@Temperature" = "300 K"
"@Pressure" = "1 atm"
"@MoleFractions" = "CH4 0.5 O2 0.6"

# unknown pressure unit
[R1]
"@Reactor" = "R1"
"Type" = "PSR"
"Phase" = "Gas"
"Energy" = "Adiabatic"
"Pressure" = "14.7 psi"
"Volume" = "1 l"
"Inlet" = 1
"Outlet" = 3

# residence time and volume together
[R2]
"@Reactor" = "R2"
"Type" = "PSR"
"Phase" = "Gas"
"Energy" = "Adiabatic"
"Pressure" = "1 atm"
"ResidenceTime" = "1 s"
"Volume" = "1 l"
"Inlet" = 2
"Outlet" = 4

# heat exchanger without UA
[R3]
"@Reactor" = "R3"
"Type" = "PFR"
"Phase" = "Gas"
"Energy" = "HeatExchanger"
"Pressure" = "1 atm"
"ResidenceTime" = "10 s"
"Inlet" = 3
"Outlet" = 5

# two phases, three streams
[PS1]
"@PhaseSplitter" = "PS1"
"InletStream" = 5
"OutletPhase" = ["gas", "liquid"]
"OutletStream" = [6, 7, 8]
"#;

#[test]
fn every_broken_block_is_reported() {
    let set = parse_dictionaries(BROKEN_TOML, Format::Toml).unwrap();
    let err = load_network(&set, &methane_air()).unwrap_err();
    let errors = &err.errors;
    assert_eq!(errors.len(), 7, "{err}");

    assert!(matches!(
        &errors[0],
        ConfigError::OverSpecified { group, found: 3, block, .. } if group == "state" && block == "feed"
    ));
    assert!(matches!(
        &errors[1],
        ConfigError::CompositionNotNormalized { block, .. } if block == "second-feed"
    ));
    assert!(matches!(
        &errors[2],
        ConfigError::UnknownUnit { quantity: Quantity::Pressure, unit, .. } if unit == "psi"
    ));
    assert!(matches!(
        &errors[3],
        ConfigError::InvalidGeometryCombination { reactor, .. } if reactor == "R2"
    ));
    assert!(matches!(
        &errors[4],
        ConfigError::MissingModeRequiredField { reactor, field, .. } if reactor == "R3" && field == "UA"
    ));
    assert!(matches!(
        &errors[5],
        ConfigError::UndefinedDictionary { name, referenced_by } if name == "R4" && referenced_by == "@Reactors"
    ));
    assert!(matches!(
        &errors[6],
        ConfigError::OutletMismatch { phases: 2, streams: 3, .. }
    ));
}

#[test]
fn error_report_names_each_block() {
    let set = parse_dictionaries(BROKEN_TOML, Format::Toml).unwrap();
    let report = load_network(&set, &methane_air()).unwrap_err().to_string();
    for name in ["feed", "second-feed", "psi", "R2", "R4", "PS1"] {
        assert!(report.contains(name), "report does not mention {name}:\n{report}");
    }
}

#[test]
fn fixing_the_blocks_loads_the_network() {
    let fixed = BROKEN_TOML
        .replace("\"@Density\" = \"1.2 kg/m3\"\n", "")
        .replace("CH4 0.5 O2 0.6", "CH4 0.4 O2 0.6")
        .replace("14.7 psi", "1 atm")
        .replace("\"ResidenceTime\" = \"1 s\"\n", "")
        .replace("\"Energy\" = \"HeatExchanger\"", "\"Energy\" = \"HeatExchanger\"\n\"UA\" = \"5 W/K\"")
        .replace("\"R3\", \"R4\"", "\"R3\"")
        .replace("[6, 7, 8]", "[6, 7]");
    let set = parse_dictionaries(&fixed, Format::Toml).unwrap();
    let network = load_network(&set, &methane_air()).unwrap();
    assert_eq!(network.units.len(), 6);
}
