use crate::id::KeywordId;
use std::collections::HashMap;

/// Shape of the value carried by a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// One string token.
    String,
    /// One string token naming a filesystem path.
    Path,
    /// A number followed by a unit, e.g. `300 K`.
    Measure,
    /// One integer token.
    Int,
    /// One floating-point token.
    Double,
    /// Alternating `name value` pairs, e.g. `CH4 0.3 O2 0.7`.
    NamedDoubles,
    Strings,
    Ints,
    Doubles,
    /// The name of another dictionary in the same set.
    Dictionary,
    /// One or more names of other dictionaries in the same set.
    Dictionaries,
}

impl std::fmt::Display for ValueShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueShape::String => "string",
            ValueShape::Path => "path",
            ValueShape::Measure => "measure (value unit)",
            ValueShape::Int => "integer",
            ValueShape::Double => "number",
            ValueShape::NamedDoubles => "list of (name value) pairs",
            ValueShape::Strings => "list of strings",
            ValueShape::Ints => "list of integers",
            ValueShape::Doubles => "list of numbers",
            ValueShape::Dictionary => "dictionary name",
            ValueShape::Dictionaries => "list of dictionary names",
        };
        f.write_str(name)
    }
}

/// One recognized keyword and its constraint metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRule {
    pub name: String,
    pub shape: ValueShape,
    pub description: String,
    pub required: bool,
    /// Keywords that must not appear together with this one.
    pub conflicts: Vec<String>,
    /// At least one of these must also be present when this keyword is.
    pub needs_one_of: Vec<String>,
    /// Keywords forbidden once this one is chosen.
    pub implies: Vec<String>,
}

impl KeywordRule {
    pub fn new(name: &str, shape: ValueShape, description: &str) -> Self {
        Self {
            name: name.to_string(),
            shape,
            description: description.to_string(),
            required: false,
            conflicts: Vec::new(),
            needs_one_of: Vec::new(),
            implies: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn conflicts_with(mut self, keywords: &[&str]) -> Self {
        self.conflicts = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn needs_one_of(mut self, keywords: &[&str]) -> Self {
        self.needs_one_of = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn implies(mut self, keywords: &[&str]) -> Self {
        self.implies = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    fn references(&self) -> impl Iterator<Item = &String> {
        self.conflicts
            .iter()
            .chain(self.needs_one_of.iter())
            .chain(self.implies.iter())
    }
}

/// A cardinality constraint over a set of keywords: between `min` and `max`
/// of `members` must be present. A group with a trigger is only enforced when
/// the trigger keyword is present.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordGroup {
    pub name: String,
    pub members: Vec<String>,
    pub min: usize,
    pub max: usize,
    pub when: Option<String>,
}

impl KeywordGroup {
    /// Exactly `count` of `members`.
    pub fn exactly(name: &str, count: usize, members: &[&str]) -> Self {
        Self::between(name, count, count, members)
    }

    pub fn between(name: &str, min: usize, max: usize, members: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
            min,
            max,
            when: None,
        }
    }

    pub fn when(mut self, trigger: &str) -> Self {
        self.when = Some(trigger.to_string());
        self
    }
}

/// Builder for constructing an immutable [`Grammar`].
/// Two-phase lifecycle: definition -> finalization.
#[derive(Debug)]
pub struct GrammarBuilder {
    block: String,
    rules: Vec<KeywordRule>,
    name_to_id: HashMap<String, KeywordId>,
    groups: Vec<KeywordGroup>,
}

impl GrammarBuilder {
    pub fn new(block: &str) -> Self {
        Self {
            block: block.to_string(),
            rules: Vec::new(),
            name_to_id: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Phase 1: Register a keyword rule. Returns its ID.
    pub fn define(&mut self, rule: KeywordRule) -> Result<KeywordId, GrammarError> {
        if self.name_to_id.contains_key(&rule.name) {
            return Err(GrammarError::DuplicateKeyword {
                grammar: self.block.clone(),
                keyword: rule.name,
            });
        }
        let id = KeywordId(self.rules.len() as u16);
        self.name_to_id.insert(rule.name.clone(), id);
        self.rules.push(rule);
        Ok(id)
    }

    /// Phase 1: Register a cardinality group.
    pub fn group(&mut self, group: KeywordGroup) -> Result<(), GrammarError> {
        if group.min > group.max || group.max > group.members.len() {
            return Err(GrammarError::InvalidGroup {
                grammar: self.block.clone(),
                group: group.name,
            });
        }
        if self.groups.iter().any(|g| g.name == group.name) {
            return Err(GrammarError::InvalidGroup {
                grammar: self.block.clone(),
                group: group.name,
            });
        }
        self.groups.push(group);
        Ok(())
    }

    /// Phase 2: Finalize and build the immutable grammar.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        // Validate: every referenced keyword must be declared in this grammar
        for rule in &self.rules {
            for reference in rule.references() {
                if !self.name_to_id.contains_key(reference) {
                    return Err(GrammarError::UndeclaredReference {
                        grammar: self.block.clone(),
                        keyword: rule.name.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }
        for group in &self.groups {
            for member in group.members.iter().chain(group.when.iter()) {
                if !self.name_to_id.contains_key(member) {
                    return Err(GrammarError::UndeclaredReference {
                        grammar: self.block.clone(),
                        keyword: group.name.clone(),
                        reference: member.clone(),
                    });
                }
            }
        }

        Ok(Grammar {
            block: self.block,
            rules: self.rules,
            name_to_id: self.name_to_id,
            groups: self.groups,
        })
    }
}

/// Immutable grammar for one block type. Frozen after build(). Thread-safe to share.
#[derive(Debug)]
pub struct Grammar {
    block: String,
    rules: Vec<KeywordRule>,
    name_to_id: HashMap<String, KeywordId>,
    groups: Vec<KeywordGroup>,
}

impl Grammar {
    /// Block type this grammar governs, e.g. `reactor`.
    pub fn block(&self) -> &str {
        &self.block
    }

    pub fn keyword_id(&self, name: &str) -> Option<KeywordId> {
        self.name_to_id.get(name).copied()
    }

    pub fn rule(&self, name: &str) -> Option<&KeywordRule> {
        self.keyword_id(name)
            .and_then(|id| self.rules.get(id.0 as usize))
    }

    pub fn get_rule(&self, id: KeywordId) -> Option<&KeywordRule> {
        self.rules.get(id.0 as usize)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn groups(&self) -> &[KeywordGroup] {
        &self.groups
    }

    pub fn keyword_count(&self) -> usize {
        self.rules.len()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrammarError {
    #[error("keyword '{keyword}' is declared twice in the {grammar} grammar")]
    DuplicateKeyword { grammar: String, keyword: String },
    #[error("'{keyword}' in the {grammar} grammar references undeclared keyword '{reference}'")]
    UndeclaredReference {
        grammar: String,
        keyword: String,
        reference: String,
    },
    #[error("group '{group}' in the {grammar} grammar has inconsistent bounds or a duplicate name")]
    InvalidGroup { grammar: String, group: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_builder() -> GrammarBuilder {
        let mut b = GrammarBuilder::new("state");
        b.define(KeywordRule::new("@Temperature", ValueShape::Measure, "temperature"))
            .unwrap();
        b.define(KeywordRule::new("@Pressure", ValueShape::Measure, "pressure"))
            .unwrap();
        b.define(KeywordRule::new("@Density", ValueShape::Measure, "density"))
            .unwrap();
        b.group(KeywordGroup::exactly(
            "state",
            2,
            &["@Temperature", "@Pressure", "@Density"],
        ))
        .unwrap();
        b
    }

    #[test]
    fn define_and_build() {
        let grammar = setup_builder().build().unwrap();
        assert_eq!(grammar.block(), "state");
        assert_eq!(grammar.keyword_count(), 3);
        assert_eq!(grammar.groups().len(), 1);
    }

    #[test]
    fn lookup_by_name() {
        let grammar = setup_builder().build().unwrap();
        assert_eq!(grammar.keyword_id("@Pressure"), Some(KeywordId(1)));
        assert!(grammar.declares("@Density"));
        assert!(!grammar.declares("@Volume"));
        let rule = grammar.rule("@Temperature").unwrap();
        assert_eq!(rule.shape, ValueShape::Measure);
        assert!(!rule.required);
    }

    #[test]
    fn rules_keep_declaration_order() {
        let grammar = setup_builder().build().unwrap();
        let names: Vec<&str> = grammar.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["@Temperature", "@Pressure", "@Density"]);
    }

    #[test]
    fn duplicate_keyword_fails_at_define() {
        let mut b = setup_builder();
        let result = b.define(KeywordRule::new("@Pressure", ValueShape::String, "again"));
        match result {
            Err(GrammarError::DuplicateKeyword { keyword, grammar }) => {
                assert_eq!(keyword, "@Pressure");
                assert_eq!(grammar, "state");
            }
            other => panic!("expected DuplicateKeyword, got: {other:?}"),
        }
    }

    #[test]
    fn forward_references_are_allowed() {
        let mut b = GrammarBuilder::new("network");
        b.define(
            KeywordRule::new("@KineticsFolder", ValueShape::Path, "folder")
                .required()
                .conflicts_with(&["@KineticsPreProcessor"]),
        )
        .unwrap();
        b.define(
            KeywordRule::new("@KineticsPreProcessor", ValueShape::Dictionary, "pre")
                .required()
                .conflicts_with(&["@KineticsFolder"]),
        )
        .unwrap();
        assert!(b.build().is_ok());
    }

    #[test]
    fn undeclared_reference_fails_at_build() {
        let mut b = GrammarBuilder::new("reactor");
        b.define(
            KeywordRule::new("UA", ValueShape::Measure, "ua")
                .conflicts_with(&["GlobalExchangeCoefficient"]),
        )
        .unwrap();
        match b.build() {
            Err(GrammarError::UndeclaredReference {
                keyword, reference, ..
            }) => {
                assert_eq!(keyword, "UA");
                assert_eq!(reference, "GlobalExchangeCoefficient");
            }
            other => panic!("expected UndeclaredReference, got: {other:?}"),
        }
    }

    #[test]
    fn undeclared_group_member_fails_at_build() {
        let mut b = setup_builder();
        b.group(KeywordGroup::exactly("composition", 1, &["@Moles", "@Masses"]))
            .unwrap();
        assert!(matches!(
            b.build(),
            Err(GrammarError::UndeclaredReference { .. })
        ));
    }

    #[test]
    fn undeclared_group_trigger_fails_at_build() {
        let mut b = setup_builder();
        b.group(
            KeywordGroup::exactly("pair", 1, &["@Temperature", "@Pressure"]).when("@Ratio"),
        )
        .unwrap();
        assert!(matches!(
            b.build(),
            Err(GrammarError::UndeclaredReference { ref reference, .. }) if reference == "@Ratio"
        ));
    }

    #[test]
    fn inconsistent_group_bounds_rejected() {
        let mut b = setup_builder();
        let result = b.group(KeywordGroup::between(
            "bad",
            3,
            2,
            &["@Temperature", "@Pressure", "@Density"],
        ));
        assert!(matches!(result, Err(GrammarError::InvalidGroup { .. })));

        let result = b.group(KeywordGroup::exactly("too_many", 4, &["@Temperature"]));
        assert!(matches!(result, Err(GrammarError::InvalidGroup { .. })));
    }

    #[test]
    fn duplicate_group_name_rejected() {
        let mut b = setup_builder();
        let result = b.group(KeywordGroup::exactly("state", 1, &["@Density"]));
        assert!(matches!(result, Err(GrammarError::InvalidGroup { .. })));
    }

    #[test]
    fn grammar_is_immutable_after_build() {
        // Grammar has no &mut self methods -- immutability enforced by the type system.
        let grammar = setup_builder().build().unwrap();
        let _ = grammar.get_rule(KeywordId(0));
        let _ = grammar.rules();
        let _ = grammar.groups();
    }

    #[test]
    fn empty_grammar_builds_successfully() {
        let grammar = GrammarBuilder::new("empty").build().unwrap();
        assert_eq!(grammar.keyword_count(), 0);
        assert!(grammar.get_rule(KeywordId(0)).is_none());
    }

    #[test]
    fn error_display_messages() {
        let e = GrammarError::DuplicateKeyword {
            grammar: "reactor".to_string(),
            keyword: "Type".to_string(),
        };
        assert!(e.to_string().contains("Type"));
        assert!(e.to_string().contains("reactor"));

        let e = GrammarError::UndeclaredReference {
            grammar: "reactor".to_string(),
            keyword: "UA".to_string(),
            reference: "Foo".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("UA"));
        assert!(msg.contains("Foo"));
    }
}
