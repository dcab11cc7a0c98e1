//! reactnet data -- loading and resolution of reactor-network configuration.
//!
//! Reads network files (RON, JSON or TOML) into dictionaries, checks each
//! block against its grammar, converts every value to canonical units and
//! assembles typed unit descriptors.
//!
//! # Key Types
//!
//! - [`network::load_network`] -- Top-level load routine; aggregates every
//!   block failure into [`network::LoadErrors`].
//! - [`builder::Unvalidated`] -- Entry stage of the per-block pipeline.
//! - [`descriptor::UnitDescriptor`] -- Resolved output of one block.
//! - [`resolver::GasState`] -- Temperature, pressure and mass fractions of a mixture.
//! - [`grammars::GrammarSet`] -- The shared, immutable grammars.

pub mod builder;
pub mod descriptor;
pub mod grammars;
pub mod loader;
pub mod network;
pub mod reactor;
pub mod resolver;
pub mod schema;

pub use descriptor::UnitDescriptor;
pub use loader::{load_case, load_dictionaries, load_species, DataLoadError, Format};
pub use network::{load_network, LoadErrors, Network};
