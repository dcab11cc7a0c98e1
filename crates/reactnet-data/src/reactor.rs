//! Reactor resolution: energy-mode gating and geometry.
//!
//! A PSR is sized by `ResidenceTime` or `Volume`; a PFR by `ResidenceTime` or
//! the pair `Diameter` + `Length`. Exactly one sizing form must be given.
//! `Isothermal` needs `Temperature`, `HeatExchanger` needs `UA` or
//! `GlobalExchangeCoefficient`, `Adiabatic` needs nothing more.

use crate::descriptor::{EnergyMode, HeatExchange, Phase, ReactorDescriptor, ReactorType, Sizing};
use crate::resolver::{choice, optional_measure, positive_measure, stream};
use reactnet_core::error::ConfigError;
use reactnet_core::units::Quantity;
use reactnet_core::RawDictionary;

pub const REACTOR_TYPES: [(&str, ReactorType); 2] =
    [("PSR", ReactorType::Psr), ("PFR", ReactorType::Pfr)];

pub const PHASES: [(&str, Phase); 2] = [("Gas", Phase::Gas), ("Liquid", Phase::Liquid)];

pub const ENERGY_MODES: [(&str, EnergyMode); 3] = [
    ("Isothermal", EnergyMode::Isothermal),
    ("Adiabatic", EnergyMode::Adiabatic),
    ("HeatExchanger", EnergyMode::HeatExchanger),
];

/// Resolve a validated reactor dictionary.
pub fn resolve_reactor(dict: &RawDictionary) -> Result<ReactorDescriptor, ConfigError> {
    let name = dict.read_string("@Reactor")?.to_string();
    let reactor_type = choice(dict, "Type", &REACTOR_TYPES)?;
    let phase = choice(dict, "Phase", &PHASES)?;
    let energy = choice(dict, "Energy", &ENERGY_MODES)?;
    let pressure = positive_measure(dict, "Pressure", Quantity::Pressure)?;

    let temperature = match optional_measure(dict, "Temperature", Quantity::Temperature)? {
        Some(t) if t <= 0.0 => {
            return Err(ConfigError::invalid("Temperature", t, "must be positive", dict.name()));
        }
        other => other,
    };
    if energy == EnergyMode::Isothermal && temperature.is_none() {
        return Err(mode_field(energy, "Temperature", &name));
    }
    let heat_exchange = resolve_heat_exchange(dict, energy, &name)?;
    let sizing = resolve_sizing(dict, reactor_type, &name)?;

    Ok(ReactorDescriptor {
        name,
        reactor_type,
        phase,
        energy,
        pressure,
        temperature,
        sizing,
        heat_exchange,
        inlet: stream(dict, "Inlet")?,
        outlet: stream(dict, "Outlet")?,
    })
}

fn mode_field(mode: EnergyMode, field: &str, reactor: &str) -> ConfigError {
    ConfigError::MissingModeRequiredField {
        mode: mode.to_string(),
        field: field.to_string(),
        reactor: reactor.to_string(),
    }
}

fn resolve_heat_exchange(
    dict: &RawDictionary,
    energy: EnergyMode,
    reactor: &str,
) -> Result<HeatExchange, ConfigError> {
    let ua = optional_measure(dict, "UA", Quantity::HeatTransferRate)?;
    let coefficient =
        optional_measure(dict, "GlobalExchangeCoefficient", Quantity::ExchangeCoefficient)?;

    if energy != EnergyMode::HeatExchanger {
        if let Some(key) = ["UA", "GlobalExchangeCoefficient"]
            .into_iter()
            .find(|key| dict.exists(key))
        {
            return Err(ConfigError::invalid(
                key,
                energy,
                "heat exchange is only used with Energy HeatExchanger",
                dict.name(),
            ));
        }
        return Ok(HeatExchange::None);
    }

    let exchange = match (ua, coefficient) {
        (Some(ua), None) => ("UA", ua, HeatExchange::Ua(ua)),
        (None, Some(u)) => ("GlobalExchangeCoefficient", u, HeatExchange::Coefficient(u)),
        (Some(_), Some(_)) => {
            return Err(ConfigError::ConflictingKeywords {
                present: vec!["UA".to_string(), "GlobalExchangeCoefficient".to_string()],
                block: dict.name().to_string(),
            });
        }
        (None, None) => return Err(mode_field(energy, "UA", reactor)),
    };
    match exchange {
        (key, value, _) if value < 0.0 => Err(ConfigError::invalid(
            key,
            value,
            "must be non-negative",
            dict.name(),
        )),
        (_, _, heat_exchange) => Ok(heat_exchange),
    }
}

fn resolve_sizing(
    dict: &RawDictionary,
    reactor_type: ReactorType,
    reactor: &str,
) -> Result<Sizing, ConfigError> {
    let invalid = |detail: &str| ConfigError::InvalidGeometryCombination {
        reactor: reactor.to_string(),
        detail: detail.to_string(),
    };
    let has = |key: &str| dict.exists(key);
    let residence_time = has("ResidenceTime");

    match reactor_type {
        ReactorType::Psr => {
            if has("Diameter") || has("Length") {
                return Err(invalid("a PSR is not sized by Diameter or Length"));
            }
            match (residence_time, has("Volume")) {
                (true, true) => Err(invalid("ResidenceTime and Volume are both given")),
                (true, false) => Ok(Sizing::ResidenceTime(positive_measure(
                    dict,
                    "ResidenceTime",
                    Quantity::Time,
                )?)),
                (false, true) => Ok(Sizing::Volume(positive_measure(
                    dict,
                    "Volume",
                    Quantity::Volume,
                )?)),
                (false, false) => Err(invalid("a PSR needs ResidenceTime or Volume")),
            }
        }
        ReactorType::Pfr => {
            if has("Volume") {
                return Err(invalid("a PFR is not sized by Volume"));
            }
            match (residence_time, has("Diameter"), has("Length")) {
                (true, false, false) => Ok(Sizing::ResidenceTime(positive_measure(
                    dict,
                    "ResidenceTime",
                    Quantity::Time,
                )?)),
                (true, _, _) => Err(invalid(
                    "ResidenceTime and Diameter/Length are both given",
                )),
                (false, true, true) => Ok(Sizing::Tube {
                    diameter: positive_measure(dict, "Diameter", Quantity::Length)?,
                    length: positive_measure(dict, "Length", Quantity::Length)?,
                }),
                (false, false, false) => {
                    Err(invalid("a PFR needs ResidenceTime or Diameter and Length"))
                }
                (false, _, _) => Err(invalid("Diameter and Length must be given together")),
            }
        }
    }
}
