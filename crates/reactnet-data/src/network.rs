//! Top-level load routine: validates the network dictionary, builds every
//! referenced unit, and reports all failures together.
//!
//! No descriptor escapes a load that failed anywhere: either every block
//! builds and a [`Network`] is returned, or [`LoadErrors`] lists every
//! failure found.

use crate::builder::{BlockKind, DescriptorSink, Unvalidated};
use crate::descriptor::{InletDescriptor, ReactorDescriptor, UnitDescriptor};
use crate::grammars::{grammars, GrammarSet};
use crate::resolver::optional_measure;
use reactnet_core::error::ConfigError;
use reactnet_core::units::Quantity;
use reactnet_core::validation::{validate, violations};
use reactnet_core::{DictionarySet, Grammar, RawDictionary, Thermodynamics};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn};

/// Name of the top-level dictionary of a network file.
pub const NETWORK_DICTIONARY: &str = "Network";

/// Unit lists of the network dictionary, in build order.
const UNIT_LISTS: [(&str, BlockKind); 5] = [
    ("@Inlets", BlockKind::Inlet),
    ("@Reactors", BlockKind::Reactor),
    ("@Mixers", BlockKind::Mixer),
    ("@Splitters", BlockKind::Splitter),
    ("@PhaseSplitters", BlockKind::PhaseSplitter),
];

// ===========================================================================
// Errors
// ===========================================================================

/// Every configuration error found while loading a network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} configuration error(s):\n{}", .errors.len(), render(.errors))]
pub struct LoadErrors {
    pub errors: Vec<ConfigError>,
}

fn render(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl LoadErrors {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigError> {
        self.errors.iter()
    }
}

impl From<ConfigError> for LoadErrors {
    fn from(error: ConfigError) -> Self {
        LoadErrors {
            errors: vec![error],
        }
    }
}

// ===========================================================================
// Network settings
// ===========================================================================

/// Where the kinetic scheme comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum KineticsSource {
    /// A folder with a pre-processed scheme.
    Folder(PathBuf),
    /// A dictionary listing the kinetic files to interpret.
    PreProcessor(String),
}

/// Network solver options (`@Options`).
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    /// Default 500.
    pub max_iterations: u32,
    /// Default 1e-6.
    pub tolerance: f64,
    /// Default `Output`.
    pub output_folder: PathBuf,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-6,
            output_folder: PathBuf::from("Output"),
        }
    }
}

/// Stiff ODE solver parameters (`@OdeParameters`).
#[derive(Debug, Clone, PartialEq)]
pub struct OdeParameters {
    /// Default 1e-12.
    pub absolute_tolerance: f64,
    /// Default 1e-7.
    pub relative_tolerance: f64,
    /// Default 500000.
    pub maximum_number_of_steps: u32,
    /// s; `None` leaves the step unbounded.
    pub maximum_step: Option<f64>,
}

impl Default for OdeParameters {
    fn default() -> Self {
        Self {
            absolute_tolerance: 1e-12,
            relative_tolerance: 1e-7,
            maximum_number_of_steps: 500_000,
            maximum_step: None,
        }
    }
}

/// A fully loaded network: settings plus one descriptor per declared unit,
/// in declaration order (inlets, reactors, mixers, splitters, phase splitters).
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub kinetics: KineticsSource,
    pub options: SolverOptions,
    pub ode_parameters: OdeParameters,
    pub units: Vec<UnitDescriptor>,
}

impl Network {
    pub fn unit(&self, name: &str) -> Option<&UnitDescriptor> {
        self.units.iter().find(|u| u.name() == name)
    }

    pub fn reactors(&self) -> impl Iterator<Item = &ReactorDescriptor> {
        self.units.iter().filter_map(UnitDescriptor::as_reactor)
    }

    pub fn inlets(&self) -> impl Iterator<Item = &InletDescriptor> {
        self.units.iter().filter_map(UnitDescriptor::as_inlet)
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Load a network from its dictionaries.
///
/// Every block is attempted even after a failure so that all errors are
/// reported at once.
pub fn load_network(
    set: &DictionarySet,
    thermo: &impl Thermodynamics,
) -> Result<Network, LoadErrors> {
    let grammars = grammars().map_err(ConfigError::from)?;
    let root = set
        .get(NETWORK_DICTIONARY)
        .ok_or_else(|| ConfigError::UndefinedDictionary {
            name: NETWORK_DICTIONARY.to_string(),
            referenced_by: "network file".to_string(),
        })?;

    let root_errors = violations(root, &grammars.network);
    if !root_errors.is_empty() {
        return Err(LoadErrors {
            errors: root_errors,
        });
    }

    let mut errors = Vec::new();
    let kinetics = collect(&mut errors, kinetics_source(root, set));
    let options = collect(
        &mut errors,
        settings(root, set, "@Options", &grammars.options, read_options),
    );
    let ode_parameters = collect(
        &mut errors,
        settings(
            root,
            set,
            "@OdeParameters",
            &grammars.ode_parameters,
            read_ode_parameters,
        ),
    );

    let mut sink = DescriptorSink::new();
    let mut unit_names = HashSet::new();
    for (key, kind) in UNIT_LISTS {
        if !root.exists(key) {
            continue;
        }
        let Some(names) = collect(&mut errors, root.read_strings(key).map_err(ConfigError::from))
        else {
            continue;
        };
        for name in &names {
            let span = info_span!("block", kind = kind.label(), name = name.as_str());
            let _enter = span.enter();
            let built = build_unit(
                name,
                kind,
                key,
                set,
                grammars,
                thermo,
                &mut unit_names,
                &mut sink,
            );
            if let Err(error) = built {
                warn!(%error, "block rejected");
                errors.push(error);
            }
        }
    }

    match (kinetics, options, ode_parameters) {
        (Some(kinetics), Some(options), Some(ode_parameters)) if errors.is_empty() => {
            let units = sink.into_descriptors();
            info!(units = units.len(), "network loaded");
            Ok(Network {
                kinetics,
                options,
                ode_parameters,
                units,
            })
        }
        _ => {
            warn!(errors = errors.len(), "network rejected");
            Err(LoadErrors { errors })
        }
    }
}

/// Push the error, if any, and keep going.
fn collect<T>(errors: &mut Vec<ConfigError>, result: Result<T, ConfigError>) -> Option<T> {
    result.map_err(|e| errors.push(e)).ok()
}

#[allow(clippy::too_many_arguments)]
fn build_unit(
    name: &str,
    kind: BlockKind,
    referenced_by: &str,
    set: &DictionarySet,
    grammars: &GrammarSet,
    thermo: &impl Thermodynamics,
    unit_names: &mut HashSet<String>,
    sink: &mut DescriptorSink,
) -> Result<(), ConfigError> {
    let dict = referenced(set, name, referenced_by)?;
    let resolved = Unvalidated::new(kind, dict)
        .validate(grammars)?
        .resolve(thermo)?;
    let unit = resolved.descriptor().name().to_string();
    if !unit_names.insert(unit.clone()) {
        return Err(ConfigError::DuplicateUnit { name: unit });
    }
    let index = resolved.append_to(sink);
    debug!(index, "built");
    Ok(())
}

fn referenced<'a>(
    set: &'a DictionarySet,
    name: &str,
    referenced_by: &str,
) -> Result<&'a RawDictionary, ConfigError> {
    set.get(name).ok_or_else(|| ConfigError::UndefinedDictionary {
        name: name.to_string(),
        referenced_by: referenced_by.to_string(),
    })
}

fn kinetics_source(root: &RawDictionary, set: &DictionarySet) -> Result<KineticsSource, ConfigError> {
    if root.exists("@KineticsFolder") {
        return Ok(KineticsSource::Folder(PathBuf::from(
            root.read_string("@KineticsFolder")?,
        )));
    }
    let name = root.read_string("@KineticsPreProcessor")?;
    referenced(set, name, "@KineticsPreProcessor")?;
    Ok(KineticsSource::PreProcessor(name.to_string()))
}

/// Read an optional settings dictionary referenced by `key`, or its defaults.
fn settings<T: Default>(
    root: &RawDictionary,
    set: &DictionarySet,
    key: &str,
    grammar: &Grammar,
    read: fn(&RawDictionary) -> Result<T, ConfigError>,
) -> Result<T, ConfigError> {
    if !root.exists(key) {
        return Ok(T::default());
    }
    let dict = referenced(set, root.read_string(key)?, key)?;
    validate(dict, grammar)?;
    read(dict)
}

fn positive_int(dict: &RawDictionary, key: &str) -> Result<Option<u32>, ConfigError> {
    if !dict.exists(key) {
        return Ok(None);
    }
    let value = dict.read_int(key)?;
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(Some(v)),
        _ => Err(ConfigError::invalid(key, value, "must be a positive integer", dict.name())),
    }
}

fn positive_double(dict: &RawDictionary, key: &str) -> Result<Option<f64>, ConfigError> {
    if !dict.exists(key) {
        return Ok(None);
    }
    let value = dict.read_double(key)?;
    if value > 0.0 {
        Ok(Some(value))
    } else {
        Err(ConfigError::invalid(key, value, "must be positive", dict.name()))
    }
}

fn read_options(dict: &RawDictionary) -> Result<SolverOptions, ConfigError> {
    let defaults = SolverOptions::default();
    Ok(SolverOptions {
        max_iterations: positive_int(dict, "@MaxIterations")?.unwrap_or(defaults.max_iterations),
        tolerance: positive_double(dict, "@Tolerance")?.unwrap_or(defaults.tolerance),
        output_folder: if dict.exists("@OutputFolder") {
            PathBuf::from(dict.read_string("@OutputFolder")?)
        } else {
            defaults.output_folder
        },
    })
}

fn read_ode_parameters(dict: &RawDictionary) -> Result<OdeParameters, ConfigError> {
    let defaults = OdeParameters::default();
    let maximum_step = match optional_measure(dict, "@MaximumStep", Quantity::Time)? {
        Some(step) if step <= 0.0 => {
            return Err(ConfigError::invalid("@MaximumStep", step, "must be positive", dict.name()));
        }
        Some(step) => Some(step),
        None => defaults.maximum_step,
    };
    Ok(OdeParameters {
        absolute_tolerance: positive_double(dict, "@AbsoluteTolerance")?
            .unwrap_or(defaults.absolute_tolerance),
        relative_tolerance: positive_double(dict, "@RelativeTolerance")?
            .unwrap_or(defaults.relative_tolerance),
        maximum_number_of_steps: positive_int(dict, "@MaximumNumberOfSteps")?
            .unwrap_or(defaults.maximum_number_of_steps),
        maximum_step,
    })
}
