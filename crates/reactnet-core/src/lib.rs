//! reactnet core -- declarative validation for reactor-network configuration.
//!
//! This crate holds the pieces every configuration block goes through before
//! it becomes a typed unit descriptor:
//!
//! 1. **Grammar** -- the keywords a block type recognizes, their value shapes
//!    and their relationships (required, conflicts, needs-one-of, implies,
//!    cardinality groups). Built once through [`grammar::GrammarBuilder`] and
//!    frozen into an immutable [`grammar::Grammar`].
//! 2. **Dictionary** -- the tokenized key/value block ([`dictionary::RawDictionary`])
//!    with shape-checked typed reads.
//! 3. **Validation** -- presence-only checks of a dictionary against a grammar
//!    ([`validation::validate`]).
//! 4. **Units** -- conversion of `(value, unit)` measures into canonical SI
//!    units ([`units::Quantity`]).
//! 5. **Thermodynamics** -- the species model interface used when resolving
//!    compositions ([`thermo::Thermodynamics`]).
//!
//! # Key Types
//!
//! - [`error::ConfigError`] -- Every way a block can be rejected, carrying the
//!   block and keyword context.
//! - [`id::StreamId`] -- Identifier of a stream between units.

pub mod dictionary;
pub mod error;
pub mod grammar;
pub mod id;
pub mod thermo;
pub mod units;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use dictionary::{DictionaryError, DictionarySet, RawDictionary};
pub use error::ConfigError;
pub use grammar::{Grammar, GrammarBuilder, GrammarError, KeywordGroup, KeywordRule, ValueShape};
pub use thermo::{SpeciesError, SpeciesTable, Thermodynamics};
pub use units::Quantity;
