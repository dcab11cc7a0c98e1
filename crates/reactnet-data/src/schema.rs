//! Serde data file structs for network and species definitions.
//!
//! A network file is a map of dictionary name -> (keyword -> value). Values
//! are kept as loose scalars or lists and flattened into the whitespace token
//! stream that [`RawDictionary`] stores, so `"300 K"`, `["300", "K"]` and
//! `[300, "K"]` all read the same.

use indexmap::IndexMap;
use reactnet_core::thermo::Species;
use reactnet_core::{DictionaryError, DictionarySet, RawDictionary};
use serde::de::{MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

// ===========================================================================
// Network dictionaries
// ===========================================================================

/// One keyword value as written in a data file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<TokenValue>),
}

impl TokenValue {
    /// Append this value's tokens to `out`.
    pub fn flatten_into(&self, out: &mut Vec<String>) {
        match self {
            TokenValue::Int(v) => out.push(v.to_string()),
            TokenValue::Float(v) => out.push(v.to_string()),
            TokenValue::Text(s) => out.extend(s.split_whitespace().map(str::to_string)),
            TokenValue::List(items) => items.iter().for_each(|item| item.flatten_into(out)),
        }
    }

    pub fn tokens(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }
}

/// A dictionary as written in a data file: keyword -> value, in file order.
pub type DictionaryData = IndexMap<String, TokenValue>;

/// A whole network file: dictionary name -> dictionary, in file order.
///
/// Deserialized from a map, but a name that appears twice is kept twice so
/// that [`into_dictionary_set`] can reject it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkData {
    pub dictionaries: Vec<(String, DictionaryData)>,
}

impl<'de> Deserialize<'de> for NetworkData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Entries;

        impl<'de> Visitor<'de> for Entries {
            type Value = NetworkData;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of dictionary names to dictionaries")
            }

            fn visit_map<A>(self, mut map: A) -> Result<NetworkData, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut dictionaries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, DictionaryData>()? {
                    dictionaries.push(entry);
                }
                Ok(NetworkData { dictionaries })
            }
        }

        deserializer.deserialize_map(Entries)
    }
}

/// Convert deserialized network data into tokenized dictionaries.
/// Fails on the first dictionary name that was already used.
pub fn into_dictionary_set(data: NetworkData) -> Result<DictionarySet, DictionaryError> {
    let mut set = DictionarySet::new();
    for (name, entries) in data.dictionaries {
        let mut dictionary = RawDictionary::new(&name);
        for (key, value) in &entries {
            dictionary.insert(key, value.tokens());
        }
        set.try_insert(dictionary)?;
    }
    Ok(set)
}

// ===========================================================================
// Species
// ===========================================================================

/// A species definition in a data file. Molecular weight is in kg/kmol.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesData {
    pub name: String,
    pub molecular_weight: f64,
    #[serde(default)]
    pub carbon: u32,
    #[serde(default)]
    pub hydrogen: u32,
    #[serde(default)]
    pub oxygen: u32,
    #[serde(default)]
    pub nitrogen: u32,
}

impl SpeciesData {
    pub fn to_species(&self) -> Species {
        Species::new(&self.name, self.molecular_weight).atoms(
            self.carbon,
            self.hydrogen,
            self.oxygen,
            self.nitrogen,
        )
    }
}

// ===========================================================================
// TOML wrappers
// ===========================================================================

/// TOML wrapper for species: `[[species]]` array of tables.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlSpecies {
    pub species: Vec<SpeciesData>,
}
