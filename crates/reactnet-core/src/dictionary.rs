//! Raw keyword dictionaries as produced by a tokenizer.
//!
//! A [`RawDictionary`] maps case-sensitive keyword names to un-interpreted
//! token streams. Typed reads check the token shape and fail with a
//! [`DictionaryError`] on mismatch; they never apply units or grammar rules.

use crate::grammar::ValueShape;
use indexmap::IndexMap;

/// One named dictionary: keyword -> tokens, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDictionary {
    name: String,
    entries: IndexMap<String, Vec<String>>,
}

impl RawDictionary {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: IndexMap::new(),
        }
    }

    /// Insert a keyword with an explicit token list, replacing any previous value.
    pub fn insert(&mut self, key: &str, tokens: Vec<String>) {
        self.entries.insert(key.to_string(), tokens);
    }

    /// Chainable insert that splits `value` on whitespace.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value.split_whitespace().map(str::to_string).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tokens(&self, key: &str) -> Result<&[String], DictionaryError> {
        self.entries
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| DictionaryError::Missing {
                dictionary: self.name.clone(),
                key: key.to_string(),
            })
    }

    pub fn read_string(&self, key: &str) -> Result<&str, DictionaryError> {
        match self.tokens(key)? {
            [single] => Ok(single.as_str()),
            other => Err(self.mismatch(key, ValueShape::String, other)),
        }
    }

    pub fn read_measure(&self, key: &str) -> Result<(f64, &str), DictionaryError> {
        match self.tokens(key)? {
            [value, unit] => {
                let value = parse_finite(value)
                    .ok_or_else(|| self.mismatch(key, ValueShape::Measure, &[value.clone()]))?;
                Ok((value, unit.as_str()))
            }
            other => Err(self.mismatch(key, ValueShape::Measure, other)),
        }
    }

    pub fn read_int(&self, key: &str) -> Result<i64, DictionaryError> {
        match self.tokens(key)? {
            [single] => single
                .parse::<i64>()
                .map_err(|_| self.mismatch(key, ValueShape::Int, &[single.clone()])),
            other => Err(self.mismatch(key, ValueShape::Int, other)),
        }
    }

    pub fn read_double(&self, key: &str) -> Result<f64, DictionaryError> {
        match self.tokens(key)? {
            [single] => parse_finite(single)
                .ok_or_else(|| self.mismatch(key, ValueShape::Double, &[single.clone()])),
            other => Err(self.mismatch(key, ValueShape::Double, other)),
        }
    }

    /// Read alternating `name value` tokens, preserving order.
    pub fn read_named_doubles(&self, key: &str) -> Result<Vec<(String, f64)>, DictionaryError> {
        let tokens = self.tokens(key)?;
        if tokens.is_empty() || tokens.len() % 2 != 0 {
            return Err(self.mismatch(key, ValueShape::NamedDoubles, tokens));
        }
        tokens
            .chunks_exact(2)
            .map(|pair| {
                let value = parse_finite(&pair[1])
                    .ok_or_else(|| self.mismatch(key, ValueShape::NamedDoubles, pair))?;
                Ok((pair[0].clone(), value))
            })
            .collect()
    }

    pub fn read_strings(&self, key: &str) -> Result<Vec<String>, DictionaryError> {
        let tokens = self.tokens(key)?;
        if tokens.is_empty() {
            return Err(self.mismatch(key, ValueShape::Strings, tokens));
        }
        Ok(tokens.to_vec())
    }

    pub fn read_ints(&self, key: &str) -> Result<Vec<i64>, DictionaryError> {
        let tokens = self.tokens(key)?;
        if tokens.is_empty() {
            return Err(self.mismatch(key, ValueShape::Ints, tokens));
        }
        tokens
            .iter()
            .map(|t| {
                t.parse::<i64>()
                    .map_err(|_| self.mismatch(key, ValueShape::Ints, tokens))
            })
            .collect()
    }

    pub fn read_doubles(&self, key: &str) -> Result<Vec<f64>, DictionaryError> {
        let tokens = self.tokens(key)?;
        if tokens.is_empty() {
            return Err(self.mismatch(key, ValueShape::Doubles, tokens));
        }
        tokens
            .iter()
            .map(|t| {
                parse_finite(t).ok_or_else(|| self.mismatch(key, ValueShape::Doubles, tokens))
            })
            .collect()
    }

    fn mismatch(&self, key: &str, expected: ValueShape, found: &[String]) -> DictionaryError {
        DictionaryError::ShapeMismatch {
            dictionary: self.name.clone(),
            key: key.to_string(),
            expected,
            found: found.join(" "),
        }
    }
}

/// Parse a real number token. `NaN` and infinities do not count as numbers.
fn parse_finite(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// An ordered collection of named dictionaries, e.g. one network file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DictionarySet {
    dictionaries: IndexMap<String, RawDictionary>,
}

impl DictionarySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dictionary. Returns the previous dictionary of the same name, if any.
    pub fn insert(&mut self, dictionary: RawDictionary) -> Option<RawDictionary> {
        self.dictionaries
            .insert(dictionary.name().to_string(), dictionary)
    }

    /// Add a dictionary whose name is not taken yet.
    pub fn try_insert(&mut self, dictionary: RawDictionary) -> Result<(), DictionaryError> {
        if self.contains(dictionary.name()) {
            return Err(DictionaryError::Duplicate {
                dictionary: dictionary.name().to_string(),
            });
        }
        self.insert(dictionary);
        Ok(())
    }

    pub fn with(mut self, dictionary: RawDictionary) -> Self {
        self.insert(dictionary);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RawDictionary> {
        self.dictionaries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dictionaries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dictionaries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.dictionaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionaries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DictionaryError {
    #[error("keyword '{key}' not found in dictionary '{dictionary}'")]
    Missing { dictionary: String, key: String },
    #[error("keyword '{key}' in dictionary '{dictionary}' expects {expected}, found '{found}'")]
    ShapeMismatch {
        dictionary: String,
        key: String,
        expected: ValueShape,
        found: String,
    },
    #[error("dictionary '{dictionary}' is defined more than once")]
    Duplicate { dictionary: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawDictionary {
        RawDictionary::new("feed")
            .with("@Temperature", "300 K")
            .with("@Stream", "3")
            .with("@MoleFractions", "CH4 0.3 O2 0.7")
            .with("OutletPhase", "gas liquid")
            .with("OutletStream", "2 3")
            .with("@EquivalenceRatio", "0.8 1.0 1.2")
            .with("Type", "PSR")
    }

    #[test]
    fn exists_is_case_sensitive() {
        let dict = sample();
        assert!(dict.exists("@Temperature"));
        assert!(!dict.exists("@temperature"));
        assert!(!dict.exists("@Pressure"));
    }

    #[test]
    fn read_measure() {
        let dict = sample();
        let (value, unit) = dict.read_measure("@Temperature").unwrap();
        assert_eq!(value, 300.0);
        assert_eq!(unit, "K");
    }

    #[test]
    fn read_measure_without_unit_fails() {
        let dict = RawDictionary::new("d").with("@Pressure", "101325");
        assert!(matches!(
            dict.read_measure("@Pressure"),
            Err(DictionaryError::ShapeMismatch {
                expected: ValueShape::Measure,
                ..
            })
        ));
    }

    #[test]
    fn read_measure_non_numeric_fails() {
        let dict = RawDictionary::new("d").with("@Pressure", "one atm");
        assert!(dict.read_measure("@Pressure").is_err());
    }

    #[test]
    fn non_finite_numbers_are_shape_mismatches() {
        let dict = RawDictionary::new("d")
            .with("@Temperature", "NaN K")
            .with("@Pressure", "inf atm")
            .with("@Tolerance", "-inf")
            .with("@MoleFractions", "CH4 NaN O2 1")
            .with("SplitFractions", "0.5 NaN")
            .with("@EquivalenceRatio", "nan");
        for key in ["@Temperature", "@Pressure"] {
            assert!(matches!(
                dict.read_measure(key),
                Err(DictionaryError::ShapeMismatch { .. })
            ));
        }
        assert!(matches!(
            dict.read_double("@Tolerance"),
            Err(DictionaryError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            dict.read_named_doubles("@MoleFractions"),
            Err(DictionaryError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            dict.read_doubles("SplitFractions"),
            Err(DictionaryError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            dict.read_doubles("@EquivalenceRatio"),
            Err(DictionaryError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn read_int_and_string() {
        let dict = sample();
        assert_eq!(dict.read_int("@Stream").unwrap(), 3);
        assert_eq!(dict.read_string("Type").unwrap(), "PSR");
        assert!(dict.read_int("Type").is_err());
        assert!(dict.read_string("OutletPhase").is_err());
    }

    #[test]
    fn read_named_doubles_preserves_order() {
        let pairs = sample().read_named_doubles("@MoleFractions").unwrap();
        assert_eq!(
            pairs,
            vec![("CH4".to_string(), 0.3), ("O2".to_string(), 0.7)]
        );
    }

    #[test]
    fn read_named_doubles_odd_tokens_fail() {
        let dict = RawDictionary::new("d").with("@Moles", "CH4 2 O2");
        assert!(matches!(
            dict.read_named_doubles("@Moles"),
            Err(DictionaryError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn read_vectors() {
        let dict = sample();
        assert_eq!(dict.read_strings("OutletPhase").unwrap(), ["gas", "liquid"]);
        assert_eq!(dict.read_ints("OutletStream").unwrap(), [2, 3]);
        assert_eq!(
            dict.read_doubles("@EquivalenceRatio").unwrap(),
            [0.8, 1.0, 1.2]
        );
        assert!(dict.read_ints("OutletPhase").is_err());
    }

    #[test]
    fn missing_key_names_dictionary() {
        let err = sample().read_measure("@Density").unwrap_err();
        assert_eq!(
            err,
            DictionaryError::Missing {
                dictionary: "feed".to_string(),
                key: "@Density".to_string(),
            }
        );
        assert!(err.to_string().contains("feed"));
    }

    #[test]
    fn keys_keep_insertion_order() {
        let dict = sample();
        let keys: Vec<&str> = dict.keys().collect();
        assert_eq!(keys[0], "@Temperature");
        assert_eq!(keys[keys.len() - 1], "Type");
        assert_eq!(dict.len(), 7);
    }

    #[test]
    fn dictionary_set_lookup() {
        let set = DictionarySet::new()
            .with(RawDictionary::new("a"))
            .with(RawDictionary::new("b"));
        assert!(set.contains("a"));
        assert!(set.get("c").is_none());
        assert_eq!(set.names().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn dictionary_set_insert_replaces() {
        let mut set = DictionarySet::new();
        assert!(set.insert(RawDictionary::new("a")).is_none());
        assert!(set.insert(RawDictionary::new("a")).is_some());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn dictionary_set_try_insert_rejects_taken_name() {
        let mut set = DictionarySet::new();
        set.try_insert(RawDictionary::new("R1").with("Type", "PSR"))
            .unwrap();
        let err = set
            .try_insert(RawDictionary::new("R1").with("Type", "PFR"))
            .unwrap_err();
        assert_eq!(
            err,
            DictionaryError::Duplicate {
                dictionary: "R1".to_string()
            }
        );
        assert_eq!(set.get("R1").unwrap().read_string("Type").unwrap(), "PSR");
    }
}
