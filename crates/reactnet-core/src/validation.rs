//! Constraint validation of a dictionary against a grammar.
//!
//! Validation only inspects which keywords are present. It never reads or
//! converts values, so it is pure and cheap: O(keywords x group size).

use crate::dictionary::RawDictionary;
use crate::error::ConfigError;
use crate::grammar::Grammar;

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Check `dictionary` against `grammar`, returning the first violated rule.
pub fn validate(dictionary: &RawDictionary, grammar: &Grammar) -> Result<(), ConfigError> {
    match violations(dictionary, grammar).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Collect every violated rule, in check order: unknown keywords, required
/// keywords, conflicts, companions, implied exclusions, group cardinality.
pub fn violations(dictionary: &RawDictionary, grammar: &Grammar) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    check_unknown(dictionary, grammar, &mut errors);
    check_required(dictionary, grammar, &mut errors);
    check_conflicts(dictionary, grammar, &mut errors);
    check_companions(dictionary, grammar, &mut errors);
    check_implied(dictionary, grammar, &mut errors);
    check_groups(dictionary, grammar, &mut errors);
    errors
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

fn check_unknown(dictionary: &RawDictionary, grammar: &Grammar, errors: &mut Vec<ConfigError>) {
    for key in dictionary.keys() {
        if !grammar.declares(key) {
            errors.push(ConfigError::UnknownKeyword {
                keyword: key.to_string(),
                block: dictionary.name().to_string(),
            });
        }
    }
}

/// A required keyword with conflicts is satisfied by any of its alternatives.
fn check_required(dictionary: &RawDictionary, grammar: &Grammar, errors: &mut Vec<ConfigError>) {
    let mut reported: Vec<Vec<&str>> = Vec::new();
    for rule in grammar.rules().iter().filter(|r| r.required) {
        if dictionary.exists(&rule.name) || rule.conflicts.iter().any(|c| dictionary.exists(c)) {
            continue;
        }
        let alternatives: Vec<&str> = std::iter::once(&rule.name)
            .chain(rule.conflicts.iter())
            .map(String::as_str)
            .collect();
        let mut key = alternatives.clone();
        key.sort_unstable();
        if reported.contains(&key) {
            continue;
        }
        reported.push(key);
        let keyword = alternatives.join(" | ");
        errors.push(ConfigError::MissingRequiredKeyword {
            keyword,
            block: dictionary.name().to_string(),
        });
    }
}

fn check_conflicts(dictionary: &RawDictionary, grammar: &Grammar, errors: &mut Vec<ConfigError>) {
    let mut reported: Vec<Vec<String>> = Vec::new();
    for rule in grammar.rules() {
        if !dictionary.exists(&rule.name) {
            continue;
        }
        let mut present: Vec<String> = rule
            .conflicts
            .iter()
            .filter(|c| dictionary.exists(c))
            .cloned()
            .collect();
        if present.is_empty() {
            continue;
        }
        present.insert(0, rule.name.clone());

        let mut key = present.clone();
        key.sort();
        if reported.contains(&key) {
            continue;
        }
        reported.push(key);
        errors.push(ConfigError::ConflictingKeywords {
            present,
            block: dictionary.name().to_string(),
        });
    }
}

fn check_companions(dictionary: &RawDictionary, grammar: &Grammar, errors: &mut Vec<ConfigError>) {
    for rule in grammar.rules() {
        if rule.needs_one_of.is_empty() || !dictionary.exists(&rule.name) {
            continue;
        }
        if !rule.needs_one_of.iter().any(|n| dictionary.exists(n)) {
            errors.push(ConfigError::MissingCompanion {
                keyword: rule.name.clone(),
                needs: rule.needs_one_of.clone(),
                block: dictionary.name().to_string(),
            });
        }
    }
}

fn check_implied(dictionary: &RawDictionary, grammar: &Grammar, errors: &mut Vec<ConfigError>) {
    let mut reported: Vec<(String, String)> = Vec::new();
    for rule in grammar.rules() {
        if !dictionary.exists(&rule.name) {
            continue;
        }
        for forbidden in rule.implies.iter().filter(|f| dictionary.exists(f)) {
            let pair = if rule.name < *forbidden {
                (rule.name.clone(), forbidden.clone())
            } else {
                (forbidden.clone(), rule.name.clone())
            };
            if reported.contains(&pair) {
                continue;
            }
            reported.push(pair);
            errors.push(ConfigError::ForbiddenKeyword {
                keyword: forbidden.clone(),
                chosen: rule.name.clone(),
                block: dictionary.name().to_string(),
            });
        }
    }
}

fn check_groups(dictionary: &RawDictionary, grammar: &Grammar, errors: &mut Vec<ConfigError>) {
    for group in grammar.groups() {
        if let Some(trigger) = &group.when {
            if !dictionary.exists(trigger) {
                continue;
            }
        }
        let found = group
            .members
            .iter()
            .filter(|m| dictionary.exists(m))
            .count();
        if found < group.min {
            errors.push(ConfigError::UnderSpecified {
                group: group.name.clone(),
                required: group.min,
                found,
                block: dictionary.name().to_string(),
            });
        } else if found > group.max {
            errors.push(ConfigError::OverSpecified {
                group: group.name.clone(),
                allowed: group.max,
                found,
                block: dictionary.name().to_string(),
            });
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
