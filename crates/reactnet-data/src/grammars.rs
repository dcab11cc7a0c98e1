//! The process-wide grammars for every block type of a network file.
//!
//! Grammars are built once, on first use, and shared read-only afterwards.
//! Nothing can add a rule to a [`Grammar`] after [`GrammarBuilder::build`].

use once_cell::sync::Lazy;
use reactnet_core::grammar::{
    Grammar, GrammarBuilder, GrammarError, KeywordGroup, KeywordRule, ValueShape,
};

/// Thermodynamic state keywords; exactly two are given.
pub const STATE: [&str; 3] = ["@Temperature", "@Pressure", "@Density"];

/// Composition sources; exactly one is given.
pub const COMPOSITION: [&str; 5] = [
    "@MoleFractions",
    "@MassFractions",
    "@Moles",
    "@Masses",
    "@EquivalenceRatio",
];

/// Fuel composition sources used with `@EquivalenceRatio`.
pub const FUEL: [&str; 4] = [
    "@FuelMoleFractions",
    "@FuelMassFractions",
    "@FuelMoles",
    "@FuelMasses",
];

/// Oxidizer composition sources used with `@EquivalenceRatio`.
pub const OXIDIZER: [&str; 4] = [
    "@OxidizerMoleFractions",
    "@OxidizerMassFractions",
    "@OxidizerMoles",
    "@OxidizerMasses",
];

/// All grammars, one per block type.
#[derive(Debug)]
pub struct GrammarSet {
    pub network: Grammar,
    pub reactor: Grammar,
    pub gas_status: Grammar,
    pub inlet: Grammar,
    pub phase_splitter: Grammar,
    pub mixer: Grammar,
    pub splitter: Grammar,
    pub options: Grammar,
    pub ode_parameters: Grammar,
}

static GRAMMARS: Lazy<Result<GrammarSet, GrammarError>> = Lazy::new(GrammarSet::build);

/// The shared grammar set. Fails only if a grammar definition is inconsistent.
pub fn grammars() -> Result<&'static GrammarSet, GrammarError> {
    GRAMMARS.as_ref().map_err(Clone::clone)
}

impl GrammarSet {
    pub fn build() -> Result<Self, GrammarError> {
        Ok(Self {
            network: network()?,
            reactor: reactor()?,
            gas_status: gas_status()?,
            inlet: inlet()?,
            phase_splitter: phase_splitter()?,
            mixer: mixer()?,
            splitter: splitter()?,
            options: options()?,
            ode_parameters: ode_parameters()?,
        })
    }
}

// ===========================================================================
// Network
// ===========================================================================

fn network() -> Result<Grammar, GrammarError> {
    let mut b = GrammarBuilder::new("network");
    b.define(
        KeywordRule::new(
            "@KineticsFolder",
            ValueShape::Path,
            "Folder containing the pre-processed kinetic scheme",
        )
        .required()
        .conflicts_with(&["@KineticsPreProcessor"]),
    )?;
    b.define(
        KeywordRule::new(
            "@KineticsPreProcessor",
            ValueShape::Dictionary,
            "Dictionary listing the kinetic files to interpret",
        )
        .required()
        .conflicts_with(&["@KineticsFolder"]),
    )?;
    b.define(
        KeywordRule::new(
            "@Inlets",
            ValueShape::Dictionaries,
            "Inlet dictionaries of the network",
        )
        .required(),
    )?;
    b.define(
        KeywordRule::new(
            "@Reactors",
            ValueShape::Dictionaries,
            "Reactor dictionaries of the network",
        )
        .required(),
    )?;
    b.define(KeywordRule::new(
        "@Mixers",
        ValueShape::Dictionaries,
        "Mixer dictionaries of the network",
    ))?;
    b.define(KeywordRule::new(
        "@Splitters",
        ValueShape::Dictionaries,
        "Splitter dictionaries of the network",
    ))?;
    b.define(KeywordRule::new(
        "@PhaseSplitters",
        ValueShape::Dictionaries,
        "Phase splitter dictionaries of the network",
    ))?;
    b.define(KeywordRule::new(
        "@Options",
        ValueShape::Dictionary,
        "Additional options for solving the network",
    ))?;
    b.define(KeywordRule::new(
        "@OdeParameters",
        ValueShape::Dictionary,
        "Numerical parameters of the stiff ODE solver",
    ))?;
    b.build()
}

// ===========================================================================
// Reactors
// ===========================================================================

fn reactor() -> Result<Grammar, GrammarError> {
    let mut b = GrammarBuilder::new("reactor");
    b.define(KeywordRule::new("@Reactor", ValueShape::String, "Name of this reactor").required())?;
    b.define(KeywordRule::new("Type", ValueShape::String, "Reactor type (PSR or PFR)").required())?;
    b.define(KeywordRule::new("Phase", ValueShape::String, "Reactor phase (Gas or Liquid)").required())?;
    b.define(
        KeywordRule::new(
            "Energy",
            ValueShape::String,
            "Energy mode (Isothermal, Adiabatic or HeatExchanger)",
        )
        .required(),
    )?;
    b.define(KeywordRule::new("Pressure", ValueShape::Measure, "Reactor pressure (e.g. 1 atm)").required())?;
    b.define(KeywordRule::new(
        "Temperature",
        ValueShape::Measure,
        "Reactor temperature, required when isothermal",
    ))?;
    b.define(
        KeywordRule::new(
            "UA",
            ValueShape::Measure,
            "Global exchange coefficient times area (W/K)",
        )
        .conflicts_with(&["GlobalExchangeCoefficient"]),
    )?;
    b.define(
        KeywordRule::new(
            "GlobalExchangeCoefficient",
            ValueShape::Measure,
            "Global exchange coefficient per unit area (W/m2/K)",
        )
        .conflicts_with(&["UA"]),
    )?;
    // Sizing combinations are checked by the reactor resolver.
    b.define(KeywordRule::new("ResidenceTime", ValueShape::Measure, "Residence time (e.g. 1 s)"))?;
    b.define(KeywordRule::new("Volume", ValueShape::Measure, "Volume of a PSR"))?;
    b.define(KeywordRule::new("Diameter", ValueShape::Measure, "Diameter of a PFR"))?;
    b.define(KeywordRule::new("Length", ValueShape::Measure, "Length of a PFR"))?;
    b.define(KeywordRule::new("Inlet", ValueShape::Int, "ID of the inlet stream").required())?;
    b.define(KeywordRule::new("Outlet", ValueShape::Int, "ID of the outlet stream").required())?;
    b.build()
}

// ===========================================================================
// Gas status and inlets
// ===========================================================================

fn define_gas_status(b: &mut GrammarBuilder) -> Result<(), GrammarError> {
    b.define(KeywordRule::new("@Temperature", ValueShape::Measure, "Temperature of the mixture (e.g. 500 K)"))?;
    b.define(KeywordRule::new("@Pressure", ValueShape::Measure, "Pressure of the mixture (e.g. 1 atm)"))?;
    b.define(KeywordRule::new("@Density", ValueShape::Measure, "Density of the mixture (e.g. 1 g/cm3)"))?;

    b.define(KeywordRule::new("@MoleFractions", ValueShape::NamedDoubles, "Mole fractions (e.g. CH4 0.6 H2 0.4)"))?;
    b.define(KeywordRule::new("@MassFractions", ValueShape::NamedDoubles, "Mass fractions (e.g. CH4 0.6 H2 0.4)"))?;
    b.define(KeywordRule::new("@Moles", ValueShape::NamedDoubles, "Relative moles (e.g. CH4 2 H2 1)"))?;
    b.define(KeywordRule::new("@Masses", ValueShape::NamedDoubles, "Relative masses (e.g. CH4 2 H2 1)"))?;
    b.define(KeywordRule::new(
        "@EquivalenceRatio",
        ValueShape::Doubles,
        "One or more fuel/oxidizer equivalence ratios",
    ))?;

    for (sources, role) in [(FUEL, "Fuel"), (OXIDIZER, "Oxidizer")] {
        for name in sources {
            let siblings: Vec<&str> = sources.iter().copied().filter(|s| *s != name).collect();
            b.define(
                KeywordRule::new(name, ValueShape::NamedDoubles, &format!("{role} composition"))
                    .needs_one_of(&["@EquivalenceRatio"])
                    .implies(&siblings),
            )?;
        }
    }

    b.group(KeywordGroup::exactly("state", 2, &STATE))?;
    b.group(KeywordGroup::exactly("composition", 1, &COMPOSITION))?;
    b.group(KeywordGroup::exactly("fuel", 1, &FUEL).when("@EquivalenceRatio"))?;
    b.group(KeywordGroup::exactly("oxidizer", 1, &OXIDIZER).when("@EquivalenceRatio"))?;
    Ok(())
}

fn gas_status() -> Result<Grammar, GrammarError> {
    let mut b = GrammarBuilder::new("gas status");
    define_gas_status(&mut b)?;
    b.build()
}

fn inlet() -> Result<Grammar, GrammarError> {
    let mut b = GrammarBuilder::new("inlet");
    b.define(KeywordRule::new("@Stream", ValueShape::Int, "ID of the stream this inlet feeds").required())?;
    b.define(
        KeywordRule::new("@MassFlowRate", ValueShape::Measure, "Mass flow rate (e.g. 1 kg/s)").required(),
    )?;
    define_gas_status(&mut b)?;
    b.build()
}

// ===========================================================================
// Phase splitters, mixers and splitters
// ===========================================================================

fn phase_splitter() -> Result<Grammar, GrammarError> {
    let mut b = GrammarBuilder::new("phase splitter");
    b.define(KeywordRule::new("@PhaseSplitter", ValueShape::String, "Name of this phase splitter").required())?;
    b.define(
        KeywordRule::new(
            "OutletPhase",
            ValueShape::Strings,
            "Phase of each outlet, ordered as OutletStream",
        )
        .required(),
    )?;
    b.define(
        KeywordRule::new(
            "OutletStream",
            ValueShape::Ints,
            "ID of each outlet, ordered as OutletPhase",
        )
        .required(),
    )?;
    b.define(KeywordRule::new("InletStream", ValueShape::Int, "ID of the inlet stream").required())?;
    b.build()
}

fn mixer() -> Result<Grammar, GrammarError> {
    let mut b = GrammarBuilder::new("mixer");
    b.define(KeywordRule::new("@Mixer", ValueShape::String, "Name of this mixer").required())?;
    b.define(KeywordRule::new("InletStreams", ValueShape::Ints, "IDs of the mixed streams").required())?;
    b.define(KeywordRule::new("OutletStream", ValueShape::Int, "ID of the outlet stream").required())?;
    b.build()
}

fn splitter() -> Result<Grammar, GrammarError> {
    let mut b = GrammarBuilder::new("splitter");
    b.define(KeywordRule::new("@Splitter", ValueShape::String, "Name of this splitter").required())?;
    b.define(KeywordRule::new("InletStream", ValueShape::Int, "ID of the inlet stream").required())?;
    b.define(KeywordRule::new("OutletStreams", ValueShape::Ints, "IDs of the outlet streams").required())?;
    b.define(
        KeywordRule::new(
            "SplitFractions",
            ValueShape::Doubles,
            "Fraction of the inlet sent to each outlet",
        )
        .required(),
    )?;
    b.build()
}

// ===========================================================================
// Solver options
// ===========================================================================

fn options() -> Result<Grammar, GrammarError> {
    let mut b = GrammarBuilder::new("options");
    b.define(KeywordRule::new("@MaxIterations", ValueShape::Int, "Maximum network iterations"))?;
    b.define(KeywordRule::new("@Tolerance", ValueShape::Double, "Network convergence tolerance"))?;
    b.define(KeywordRule::new("@OutputFolder", ValueShape::Path, "Folder for result files"))?;
    b.build()
}

fn ode_parameters() -> Result<Grammar, GrammarError> {
    let mut b = GrammarBuilder::new("ode parameters");
    b.define(KeywordRule::new("@AbsoluteTolerance", ValueShape::Double, "Absolute tolerance"))?;
    b.define(KeywordRule::new("@RelativeTolerance", ValueShape::Double, "Relative tolerance"))?;
    b.define(KeywordRule::new("@MaximumNumberOfSteps", ValueShape::Int, "Maximum number of steps"))?;
    b.define(KeywordRule::new("@MaximumStep", ValueShape::Measure, "Maximum step size (e.g. 0.1 s)"))?;
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactnet_core::error::ConfigError;
    use reactnet_core::test_utils::dict;
    use reactnet_core::validation::{validate, violations};

    #[test]
    fn all_grammars_build() {
        let set = grammars().unwrap();
        assert_eq!(set.network.keyword_count(), 9);
        assert_eq!(set.reactor.keyword_count(), 14);
        assert_eq!(set.phase_splitter.keyword_count(), 4);
        assert!(set.inlet.declares("@Stream"));
        assert!(!set.gas_status.declares("@Stream"));
        assert_eq!(set.inlet.groups().len(), 4);
    }

    #[test]
    fn grammars_are_shared() {
        let a = grammars().unwrap() as *const GrammarSet;
        let b = grammars().unwrap() as *const GrammarSet;
        assert_eq!(a, b);
    }

    #[test]
    fn network_kinetics_source_is_exclusive() {
        let g = &grammars().unwrap().network;
        let base = [("@Inlets", "feed"), ("@Reactors", "R1")];

        assert!(validate(&dict("Network", &base), g).is_err());

        let both = dict("Network", &base)
            .with("@KineticsFolder", "kinetics")
            .with("@KineticsPreProcessor", "pre");
        assert!(matches!(
            validate(&both, g),
            Err(ConfigError::ConflictingKeywords { .. })
        ));

        let folder = dict("Network", &base).with("@KineticsFolder", "kinetics");
        assert!(validate(&folder, g).is_ok());
    }

    #[test]
    fn reactor_exchange_forms_conflict() {
        let g = &grammars().unwrap().reactor;
        let r = dict(
            "R1",
            &[
                ("@Reactor", "R1"),
                ("Type", "PSR"),
                ("Phase", "Gas"),
                ("Energy", "HeatExchanger"),
                ("Pressure", "1 atm"),
                ("UA", "10 W/K"),
                ("GlobalExchangeCoefficient", "5 W/m2/K"),
                ("Volume", "1 l"),
                ("Inlet", "1"),
                ("Outlet", "2"),
            ],
        );
        let errs = violations(&r, g);
        assert_eq!(errs.len(), 1);
        assert!(matches!(errs[0], ConfigError::ConflictingKeywords { .. }));
    }

    #[test]
    fn reactor_sizing_is_not_a_grammar_conflict() {
        let g = &grammars().unwrap().reactor;
        let r = dict(
            "R1",
            &[
                ("@Reactor", "R1"),
                ("Type", "PSR"),
                ("Phase", "Gas"),
                ("Energy", "Adiabatic"),
                ("Pressure", "1 atm"),
                ("ResidenceTime", "1 s"),
                ("Volume", "1 l"),
                ("Inlet", "1"),
                ("Outlet", "2"),
            ],
        );
        assert!(validate(&r, g).is_ok());
    }

    #[test]
    fn fuel_keywords_need_equivalence_ratio() {
        let g = &grammars().unwrap().gas_status;
        let d = dict(
            "feed",
            &[
                ("@Temperature", "300 K"),
                ("@Pressure", "1 atm"),
                ("@MoleFractions", "N2 1"),
                ("@FuelMoles", "CH4 1"),
            ],
        );
        assert!(matches!(
            validate(&d, g),
            Err(ConfigError::MissingCompanion { .. })
        ));
    }

    #[test]
    fn equivalence_ratio_requires_fuel_and_oxidizer() {
        let g = &grammars().unwrap().gas_status;
        let d = dict(
            "feed",
            &[
                ("@Temperature", "300 K"),
                ("@Pressure", "1 atm"),
                ("@EquivalenceRatio", "1.0"),
                ("@FuelMoles", "CH4 1"),
            ],
        );
        let errs = violations(&d, g);
        assert_eq!(errs.len(), 1);
        assert!(matches!(
            &errs[0],
            ConfigError::UnderSpecified { group, .. } if group == "oxidizer"
        ));
    }

    #[test]
    fn inlet_requires_stream_and_flow() {
        let g = &grammars().unwrap().inlet;
        let d = dict(
            "feed",
            &[
                ("@Temperature", "300 K"),
                ("@Pressure", "1 atm"),
                ("@MoleFractions", "N2 1"),
            ],
        );
        let errs = violations(&d, g);
        assert_eq!(errs.len(), 2);
        assert!(errs
            .iter()
            .all(|e| matches!(e, ConfigError::MissingRequiredKeyword { .. })));
    }
}
