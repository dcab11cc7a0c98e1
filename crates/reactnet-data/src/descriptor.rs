//! Typed unit descriptors: the resolved, canonical-unit output of one block.
//!
//! Descriptors are plain values. Once built they are handed to network
//! assembly and never modified.

use crate::resolver::GasState;
use reactnet_core::id::StreamId;
use serde::Serialize;

// ===========================================================================
// Reactor vocabulary
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReactorType {
    /// Perfectly-stirred reactor.
    Psr,
    /// Plug-flow reactor.
    Pfr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Gas,
    Liquid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnergyMode {
    Isothermal,
    Adiabatic,
    HeatExchanger,
}

impl std::fmt::Display for EnergyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EnergyMode::Isothermal => "Isothermal",
            EnergyMode::Adiabatic => "Adiabatic",
            EnergyMode::HeatExchanger => "HeatExchanger",
        };
        f.write_str(name)
    }
}

/// What drives the size of a reactor. Exactly one form is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Sizing {
    /// s; the volume is derived downstream from the flow.
    ResidenceTime(f64),
    /// m3, PSR only.
    Volume(f64),
    /// m, PFR only.
    Tube { diameter: f64, length: f64 },
}

/// Heat exchange with the surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum HeatExchange {
    /// Zero exchange coefficient.
    None,
    /// W/K
    Ua(f64),
    /// W/m2/K, multiplied by the exchange area during assembly.
    Coefficient(f64),
}

impl HeatExchange {
    /// Global exchange coefficient in W/K for a reactor with `area` m2 of
    /// exchange surface. Zero when there is no exchange.
    pub fn ua(self, area: f64) -> f64 {
        match self {
            HeatExchange::None => 0.0,
            HeatExchange::Ua(ua) => ua,
            HeatExchange::Coefficient(u) => u * area,
        }
    }
}

// ===========================================================================
// Descriptors
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactorDescriptor {
    pub name: String,
    pub reactor_type: ReactorType,
    pub phase: Phase,
    pub energy: EnergyMode,
    /// Pa
    pub pressure: f64,
    /// K; always set for isothermal reactors.
    pub temperature: Option<f64>,
    pub sizing: Sizing,
    pub heat_exchange: HeatExchange,
    pub inlet: StreamId,
    pub outlet: StreamId,
}

/// Outlet `i` of a phase splitter: the phase label and stream at index `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseOutlet {
    pub phase: Phase,
    pub stream: StreamId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSplitterDescriptor {
    pub name: String,
    pub inlet: StreamId,
    pub outlets: Vec<PhaseOutlet>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InletDescriptor {
    pub name: String,
    pub stream: StreamId,
    /// kg/s
    pub mass_flow_rate: f64,
    /// One state per composition (several with a list of equivalence ratios).
    pub states: Vec<GasState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixerDescriptor {
    pub name: String,
    pub inlets: Vec<StreamId>,
    pub outlet: StreamId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplitOutlet {
    pub stream: StreamId,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitterDescriptor {
    pub name: String,
    pub inlet: StreamId,
    pub outlets: Vec<SplitOutlet>,
}

/// The resolved output of one configuration block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum UnitDescriptor {
    Reactor(ReactorDescriptor),
    PhaseSplitter(PhaseSplitterDescriptor),
    Inlet(InletDescriptor),
    Mixer(MixerDescriptor),
    Splitter(SplitterDescriptor),
}

impl UnitDescriptor {
    pub fn name(&self) -> &str {
        match self {
            UnitDescriptor::Reactor(r) => &r.name,
            UnitDescriptor::PhaseSplitter(p) => &p.name,
            UnitDescriptor::Inlet(i) => &i.name,
            UnitDescriptor::Mixer(m) => &m.name,
            UnitDescriptor::Splitter(s) => &s.name,
        }
    }

    /// Streams entering the unit. Inlets have none.
    pub fn inlet_streams(&self) -> Vec<StreamId> {
        match self {
            UnitDescriptor::Reactor(r) => vec![r.inlet],
            UnitDescriptor::PhaseSplitter(p) => vec![p.inlet],
            UnitDescriptor::Inlet(_) => Vec::new(),
            UnitDescriptor::Mixer(m) => m.inlets.clone(),
            UnitDescriptor::Splitter(s) => vec![s.inlet],
        }
    }

    /// Streams leaving the unit, in outlet order.
    pub fn outlet_streams(&self) -> Vec<StreamId> {
        match self {
            UnitDescriptor::Reactor(r) => vec![r.outlet],
            UnitDescriptor::PhaseSplitter(p) => p.outlets.iter().map(|o| o.stream).collect(),
            UnitDescriptor::Inlet(i) => vec![i.stream],
            UnitDescriptor::Mixer(m) => vec![m.outlet],
            UnitDescriptor::Splitter(s) => s.outlets.iter().map(|o| o.stream).collect(),
        }
    }

    pub fn as_reactor(&self) -> Option<&ReactorDescriptor> {
        match self {
            UnitDescriptor::Reactor(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_inlet(&self) -> Option<&InletDescriptor> {
        match self {
            UnitDescriptor::Inlet(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_phase_splitter(&self) -> Option<&PhaseSplitterDescriptor> {
        match self {
            UnitDescriptor::PhaseSplitter(p) => Some(p),
            _ => None,
        }
    }
}
