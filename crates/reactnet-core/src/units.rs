//! Unit tables for the physical quantities accepted in configuration files.
//!
//! Every quantity has one canonical internal unit (K, Pa, kg/m3, m3, m, s,
//! W/K, W/m2/K, kg/s). Input units are converted with an affine map
//! `canonical = value * scale + offset`; only temperature uses the offset.

use serde::{Deserialize, Serialize};

/// A physical quantity that carries a unit suffix in a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantity {
    Temperature,
    Pressure,
    Density,
    Volume,
    Length,
    Time,
    /// Global heat exchange coefficient times area (UA).
    HeatTransferRate,
    /// Heat exchange coefficient per unit area.
    ExchangeCoefficient,
    MassFlowRate,
}

/// Affine conversion from an input unit to the canonical unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub scale: f64,
    pub offset: f64,
}

const fn scale(scale: f64) -> Conversion {
    Conversion { scale, offset: 0.0 }
}

const TEMPERATURE: &[(&str, Conversion)] = &[
    ("K", scale(1.0)),
    (
        "C",
        Conversion {
            scale: 1.0,
            offset: 273.15,
        },
    ),
];

const PRESSURE: &[(&str, Conversion)] = &[
    ("Pa", scale(1.0)),
    ("bar", scale(1.0e5)),
    ("atm", scale(101_325.0)),
];

const DENSITY: &[(&str, Conversion)] = &[("kg/m3", scale(1.0)), ("g/cm3", scale(1.0e3))];

const VOLUME: &[(&str, Conversion)] = &[
    ("m3", scale(1.0)),
    ("cm3", scale(1.0e-6)),
    ("l", scale(1.0e-3)),
];

const LENGTH: &[(&str, Conversion)] = &[("m", scale(1.0)), ("cm", scale(1.0e-2))];

const TIME: &[(&str, Conversion)] = &[
    ("s", scale(1.0)),
    ("min", scale(60.0)),
    ("hr", scale(3600.0)),
];

const HEAT_TRANSFER_RATE: &[(&str, Conversion)] = &[("W/K", scale(1.0)), ("kW/K", scale(1.0e3))];

const EXCHANGE_COEFFICIENT: &[(&str, Conversion)] =
    &[("W/m2/K", scale(1.0)), ("kW/m2/K", scale(1.0e3))];

const MASS_FLOW_RATE: &[(&str, Conversion)] = &[
    ("kg/s", scale(1.0)),
    ("g/s", scale(1.0e-3)),
    ("kg/h", scale(1.0 / 3600.0)),
];

impl Quantity {
    /// The accepted units and their conversions. The first entry is canonical.
    pub fn table(self) -> &'static [(&'static str, Conversion)] {
        match self {
            Quantity::Temperature => TEMPERATURE,
            Quantity::Pressure => PRESSURE,
            Quantity::Density => DENSITY,
            Quantity::Volume => VOLUME,
            Quantity::Length => LENGTH,
            Quantity::Time => TIME,
            Quantity::HeatTransferRate => HEAT_TRANSFER_RATE,
            Quantity::ExchangeCoefficient => EXCHANGE_COEFFICIENT,
            Quantity::MassFlowRate => MASS_FLOW_RATE,
        }
    }

    pub fn canonical_unit(self) -> &'static str {
        self.table()[0].0
    }

    /// Lowercase name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Pressure => "pressure",
            Quantity::Density => "density",
            Quantity::Volume => "volume",
            Quantity::Length => "length",
            Quantity::Time => "time",
            Quantity::HeatTransferRate => "heat transfer rate",
            Quantity::ExchangeCoefficient => "exchange coefficient",
            Quantity::MassFlowRate => "mass flow rate",
        }
    }

    pub fn conversion(self, unit: &str) -> Option<Conversion> {
        self.table()
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, conversion)| *conversion)
    }

    /// Convert `value` expressed in `unit` into the canonical unit.
    pub fn to_canonical(self, value: f64, unit: &str) -> Result<f64, UnitError> {
        let conversion = self.conversion(unit).ok_or_else(|| UnitError {
            quantity: self,
            unit: unit.to_string(),
        })?;
        Ok(value * conversion.scale + conversion.offset)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A unit string that is not in the table of its quantity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown {quantity} unit '{unit}' (accepted: {})", accepted(.quantity))]
pub struct UnitError {
    pub quantity: Quantity,
    pub unit: String,
}

fn accepted(quantity: &Quantity) -> String {
    quantity
        .table()
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}
