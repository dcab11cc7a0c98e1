use crate::dictionary::DictionaryError;
use crate::grammar::GrammarError;
use crate::units::{Quantity, UnitError};

/// Why a configuration block was rejected. Every variant names the block
/// (dictionary) or unit it came from.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required keyword '{keyword}' in {block}")]
    MissingRequiredKeyword { keyword: String, block: String },

    #[error("keyword '{keyword}' is not recognized in {block}")]
    UnknownKeyword { keyword: String, block: String },

    #[error("conflicting keywords {} in {block}", .present.join(", "))]
    ConflictingKeywords { present: Vec<String>, block: String },

    #[error("keyword '{keyword}' in {block} needs one of: {}", .needs.join(", "))]
    MissingCompanion {
        keyword: String,
        needs: Vec<String>,
        block: String,
    },

    #[error("keyword '{keyword}' in {block} is not allowed once '{chosen}' is given")]
    ForbiddenKeyword {
        keyword: String,
        chosen: String,
        block: String,
    },

    #[error("{block}: group '{group}' requires at least {required} keyword(s), found {found}")]
    UnderSpecified {
        group: String,
        required: usize,
        found: usize,
        block: String,
    },

    #[error("{block}: group '{group}' allows at most {allowed} keyword(s), found {found}")]
    OverSpecified {
        group: String,
        allowed: usize,
        found: usize,
        block: String,
    },

    #[error("unknown {quantity} unit '{unit}' in {block}")]
    UnknownUnit {
        quantity: Quantity,
        unit: String,
        block: String,
    },

    #[error("composition in {block} must sum to 1, found {sum}")]
    CompositionNotNormalized { sum: f64, block: String },

    #[error("species '{name}' in {block} is not in the thermodynamic model")]
    UnknownSpeciesName { name: String, block: String },

    #[error("invalid geometry for reactor {reactor}: {detail}")]
    InvalidGeometryCombination { reactor: String, detail: String },

    #[error("energy mode {mode} requires '{field}' for reactor {reactor}")]
    MissingModeRequiredField {
        mode: String,
        field: String,
        reactor: String,
    },

    #[error("invalid value '{value}' for '{keyword}' in {block}: {reason}")]
    InvalidValue {
        keyword: String,
        value: String,
        reason: String,
        block: String,
    },

    #[error("{unit}: {phases} outlet phase(s) but {streams} outlet stream(s)")]
    OutletMismatch {
        unit: String,
        phases: usize,
        streams: usize,
    },

    #[error("dictionary '{name}' referenced by '{referenced_by}' is not defined")]
    UndefinedDictionary { name: String, referenced_by: String },

    #[error("unit name '{name}' is declared more than once")]
    DuplicateUnit { name: String },

    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

impl ConfigError {
    /// Attach the block name to a unit conversion failure.
    pub fn unit(err: UnitError, block: &str) -> Self {
        ConfigError::UnknownUnit {
            quantity: err.quantity,
            unit: err.unit,
            block: block.to_string(),
        }
    }

    pub fn invalid(keyword: &str, value: impl ToString, reason: &str, block: &str) -> Self {
        ConfigError::InvalidValue {
            keyword: keyword.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
            block: block.to_string(),
        }
    }
}
