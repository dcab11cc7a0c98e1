//! Per-block unit-descriptor construction.
//!
//! Every block moves through `Unvalidated -> Validated -> Resolved -> Built`.
//! Each stage is a distinct type, so a block cannot be resolved before it is
//! validated, and a failure at any stage drops the block without producing a
//! partial descriptor. Built descriptors go into an append-only
//! [`DescriptorSink`].

use crate::descriptor::{
    InletDescriptor, MixerDescriptor, PhaseOutlet, PhaseSplitterDescriptor, SplitOutlet,
    SplitterDescriptor, UnitDescriptor,
};
use crate::grammars::GrammarSet;
use crate::reactor::{resolve_reactor, PHASES};
use crate::resolver::{
    positive_measure, resolve_gas_states, stream, streams, to_stream, GasState,
    FRACTION_TOLERANCE,
};
use reactnet_core::error::ConfigError;
use reactnet_core::grammar::Grammar;
use reactnet_core::units::Quantity;
use reactnet_core::validation::validate;
use reactnet_core::{RawDictionary, Thermodynamics};
use tracing::debug;

/// The kind of unit a block declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Inlet,
    Reactor,
    PhaseSplitter,
    Mixer,
    Splitter,
}

impl BlockKind {
    pub fn grammar(self, grammars: &GrammarSet) -> &Grammar {
        match self {
            BlockKind::Inlet => &grammars.inlet,
            BlockKind::Reactor => &grammars.reactor,
            BlockKind::PhaseSplitter => &grammars.phase_splitter,
            BlockKind::Mixer => &grammars.mixer,
            BlockKind::Splitter => &grammars.splitter,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Inlet => "inlet",
            BlockKind::Reactor => "reactor",
            BlockKind::PhaseSplitter => "phase splitter",
            BlockKind::Mixer => "mixer",
            BlockKind::Splitter => "splitter",
        }
    }
}

// ===========================================================================
// Stages
// ===========================================================================

/// A block that has not been checked against its grammar.
#[derive(Debug)]
pub struct Unvalidated<'a> {
    kind: BlockKind,
    dict: &'a RawDictionary,
}

/// A block whose keywords satisfy its grammar.
#[derive(Debug)]
pub struct Validated<'a> {
    kind: BlockKind,
    dict: &'a RawDictionary,
}

/// A block whose values are converted and derived.
#[derive(Debug)]
pub struct Resolved {
    descriptor: UnitDescriptor,
}

impl<'a> Unvalidated<'a> {
    pub fn new(kind: BlockKind, dict: &'a RawDictionary) -> Self {
        Self { kind, dict }
    }

    pub fn validate(self, grammars: &GrammarSet) -> Result<Validated<'a>, ConfigError> {
        validate(self.dict, self.kind.grammar(grammars))?;
        debug!(block = self.dict.name(), "validated");
        Ok(Validated {
            kind: self.kind,
            dict: self.dict,
        })
    }
}

impl Validated<'_> {
    pub fn resolve(self, thermo: &impl Thermodynamics) -> Result<Resolved, ConfigError> {
        let dict = self.dict;
        let descriptor = match self.kind {
            BlockKind::Inlet => UnitDescriptor::Inlet(resolve_inlet(dict, thermo)?),
            BlockKind::Reactor => UnitDescriptor::Reactor(resolve_reactor(dict)?),
            BlockKind::PhaseSplitter => {
                UnitDescriptor::PhaseSplitter(resolve_phase_splitter(dict)?)
            }
            BlockKind::Mixer => UnitDescriptor::Mixer(resolve_mixer(dict)?),
            BlockKind::Splitter => UnitDescriptor::Splitter(resolve_splitter(dict)?),
        };
        debug!(block = dict.name(), unit = descriptor.name(), "resolved");
        Ok(Resolved { descriptor })
    }
}

impl Resolved {
    pub fn descriptor(&self) -> &UnitDescriptor {
        &self.descriptor
    }

    /// Hand the descriptor over to the sink. Returns its position.
    pub fn append_to(self, sink: &mut DescriptorSink) -> usize {
        sink.push(self.descriptor)
    }
}

/// Append-only collection of built descriptors, consumed by network assembly.
#[derive(Debug, Default)]
pub struct DescriptorSink {
    descriptors: Vec<UnitDescriptor>,
}

impl DescriptorSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, descriptor: UnitDescriptor) -> usize {
        self.descriptors.push(descriptor);
        self.descriptors.len() - 1
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn into_descriptors(self) -> Vec<UnitDescriptor> {
        self.descriptors
    }
}

/// Run one block through every stage and append the result to `sink`.
pub fn build_block(
    kind: BlockKind,
    dict: &RawDictionary,
    grammars: &GrammarSet,
    thermo: &impl Thermodynamics,
    sink: &mut DescriptorSink,
) -> Result<usize, ConfigError> {
    let resolved = Unvalidated::new(kind, dict)
        .validate(grammars)?
        .resolve(thermo)?;
    Ok(resolved.append_to(sink))
}

/// Validate and resolve a standalone gas-status dictionary.
pub fn gas_status(
    dict: &RawDictionary,
    grammars: &GrammarSet,
    thermo: &impl Thermodynamics,
) -> Result<Vec<GasState>, ConfigError> {
    validate(dict, &grammars.gas_status)?;
    resolve_gas_states(dict, thermo)
}

// ===========================================================================
// Resolution per block kind
// ===========================================================================

fn resolve_inlet(
    dict: &RawDictionary,
    thermo: &impl Thermodynamics,
) -> Result<InletDescriptor, ConfigError> {
    Ok(InletDescriptor {
        name: dict.name().to_string(),
        stream: stream(dict, "@Stream")?,
        mass_flow_rate: positive_measure(dict, "@MassFlowRate", Quantity::MassFlowRate)?,
        states: resolve_gas_states(dict, thermo)?,
    })
}

fn resolve_phase_splitter(dict: &RawDictionary) -> Result<PhaseSplitterDescriptor, ConfigError> {
    let name = dict.read_string("@PhaseSplitter")?.to_string();
    let phases = dict.read_strings("OutletPhase")?;
    let outlet_streams = dict.read_ints("OutletStream")?;
    if phases.len() != outlet_streams.len() {
        return Err(ConfigError::OutletMismatch {
            unit: name,
            phases: phases.len(),
            streams: outlet_streams.len(),
        });
    }

    let outlets = phases
        .iter()
        .zip(outlet_streams)
        .map(|(label, id)| {
            let phase = PHASES
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(label))
                .map(|(_, phase)| *phase)
                .ok_or_else(|| {
                    ConfigError::invalid("OutletPhase", label, "expected Gas or Liquid", dict.name())
                })?;
            Ok(PhaseOutlet {
                phase,
                stream: to_stream(id, "OutletStream", dict.name())?,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(PhaseSplitterDescriptor {
        name,
        inlet: stream(dict, "InletStream")?,
        outlets,
    })
}

fn resolve_mixer(dict: &RawDictionary) -> Result<MixerDescriptor, ConfigError> {
    Ok(MixerDescriptor {
        name: dict.read_string("@Mixer")?.to_string(),
        inlets: streams(dict, "InletStreams")?,
        outlet: stream(dict, "OutletStream")?,
    })
}

fn resolve_splitter(dict: &RawDictionary) -> Result<SplitterDescriptor, ConfigError> {
    let block = dict.name();
    let outlet_streams = streams(dict, "OutletStreams")?;
    let fractions = dict.read_doubles("SplitFractions")?;
    if fractions.len() != outlet_streams.len() {
        return Err(ConfigError::invalid(
            "SplitFractions",
            fractions.len(),
            &format!("expected {} fractions, one per outlet", outlet_streams.len()),
            block,
        ));
    }
    if let Some(negative) = fractions.iter().find(|f| **f < 0.0) {
        return Err(ConfigError::invalid(
            "SplitFractions",
            negative,
            "fractions must be non-negative",
            block,
        ));
    }
    let sum: f64 = fractions.iter().sum();
    if (sum - 1.0).abs() > FRACTION_TOLERANCE {
        return Err(ConfigError::CompositionNotNormalized {
            sum,
            block: block.to_string(),
        });
    }

    Ok(SplitterDescriptor {
        name: dict.read_string("@Splitter")?.to_string(),
        inlet: stream(dict, "InletStream")?,
        outlets: outlet_streams
            .into_iter()
            .zip(fractions)
            .map(|(stream, fraction)| SplitOutlet { stream, fraction })
            .collect(),
    })
}
