//! File loading: format detection (RON/JSON/TOML), file discovery, and
//! deserialization of network and species files.

use crate::schema::{into_dictionary_set, NetworkData, SpeciesData};
use reactnet_core::{DictionaryError, DictionarySet, SpeciesError, SpeciesTable};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Base name of the network file inside a case directory.
pub const NETWORK_FILE: &str = "network";
/// Base name of the species file inside a case directory.
pub const SPECIES_FILE: &str = "species";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while reading data files.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` according to `format`. `file` is only used for errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron | Format::Json => deserialize_str(&content, format, path),
        Format::Toml => {
            let mut table: toml::Table = deserialize_str(&content, format, path)?;
            let array = table.remove(toml_key).ok_or_else(|| DataLoadError::Parse {
                file: path.to_path_buf(),
                detail: format!("missing key '{toml_key}' in TOML file"),
            })?;
            array
                .try_into()
                .map_err(|e: toml::de::Error| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: e.to_string(),
                })
        }
    }
}

// ===========================================================================
// Network and species files
// ===========================================================================

/// Parse network dictionaries from an in-memory string.
pub fn parse_dictionaries(content: &str, format: Format) -> Result<DictionarySet, DataLoadError> {
    let file = Path::new("<memory>");
    let data: NetworkData = deserialize_str(content, format, file)?;
    dictionary_set(data, file)
}

/// Load the network dictionaries from a RON, JSON or TOML file.
/// Each dictionary name may appear only once.
pub fn load_dictionaries(path: &Path) -> Result<DictionarySet, DataLoadError> {
    let data: NetworkData = deserialize_file(path)?;
    let set = dictionary_set(data, path)?;
    debug!(file = %path.display(), dictionaries = set.len(), "loaded network dictionaries");
    Ok(set)
}

fn dictionary_set(data: NetworkData, file: &Path) -> Result<DictionarySet, DataLoadError> {
    into_dictionary_set(data).map_err(|e| match e {
        DictionaryError::Duplicate { dictionary } => DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: dictionary,
        },
        other => DataLoadError::Parse {
            file: file.to_path_buf(),
            detail: other.to_string(),
        },
    })
}

/// Load a species table. Species names must be unique and molecular weights
/// finite and positive.
pub fn load_species(path: &Path) -> Result<SpeciesTable, DataLoadError> {
    let data: Vec<SpeciesData> = deserialize_list(path, "species")?;
    let mut table = SpeciesTable::new();
    for entry in &data {
        table.add(entry.to_species()).map_err(|e| match e {
            SpeciesError::Duplicate { name } => DataLoadError::DuplicateName {
                file: path.to_path_buf(),
                name,
            },
            invalid => DataLoadError::Parse {
                file: path.to_path_buf(),
                detail: invalid.to_string(),
            },
        })?;
    }
    debug!(file = %path.display(), species = data.len(), "loaded species table");
    Ok(table)
}

/// Load `network.{ron,toml,json}` and `species.{ron,toml,json}` from a case directory.
pub fn load_case(dir: &Path) -> Result<(DictionarySet, SpeciesTable), DataLoadError> {
    let network = load_dictionaries(&require_data_file(dir, NETWORK_FILE)?)?;
    let species = load_species(&require_data_file(dir, SPECIES_FILE)?)?;
    Ok((network, species))
}

// ===========================================================================
// Tests
// ===========================================================================
