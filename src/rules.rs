//! Data-driven inference rules.
//!
//! Rules are structs, not code — they can be loaded from JSON or constructed
//! programmatically via [`RuleSet::builtin`]. A rule matches its premise
//! patterns against the current fact set and produces an instantiation of
//! its conclusion pattern; its `reliability` factor scales the confidence of
//! everything it derives.
//!
//! The abductive strategy consumes [`Hypothesis`] values through the same
//! supplied-as-data contract: hypotheses are enumerated, never induced.

use serde::{Deserialize, Serialize};

use crate::atom::LinkKind;
use crate::pattern::Pattern;
use crate::truth::TruthValue;

/// A single inference rule: match premises, produce a conclusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    /// Patterns that must all match the current fact set (conjunctive).
    pub premises: Vec<Pattern>,
    /// Pattern instantiated with the premise bindings.
    pub conclusion: Pattern,
    /// Confidence factor multiplied into derived conclusions.
    pub reliability: f32,
}

impl Rule {
    /// Create a rule with full reliability.
    pub fn new(name: impl Into<String>, premises: Vec<Pattern>, conclusion: Pattern) -> Self {
        Self {
            name: name.into(),
            premises,
            conclusion,
            reliability: 1.0,
        }
    }

    /// Set the reliability factor, clamped to `[0, 1]`.
    pub fn with_reliability(mut self, reliability: f32) -> Self {
        self.reliability = reliability.clamp(0.0, 1.0);
        self
    }
}

/// A named collection of rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Add a rule (builder style).
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The built-in ontological rule set.
    pub fn builtin() -> Self {
        let var = Pattern::var;
        let inh = |a: Pattern, b: Pattern| Pattern::link(LinkKind::Inheritance, vec![a, b]);
        let sim = |a: Pattern, b: Pattern| Pattern::link(LinkKind::Similarity, vec![a, b]);

        Self::new("builtin")
            .with_rule(
                Rule::new(
                    "inheritance-transitive",
                    vec![inh(var("X"), var("Y")), inh(var("Y"), var("Z"))],
                    inh(var("X"), var("Z")),
                )
                .with_reliability(0.95),
            )
            .with_rule(
                Rule::new(
                    "similarity-symmetric",
                    vec![sim(var("X"), var("Y"))],
                    sim(var("Y"), var("X")),
                )
                .with_reliability(1.0),
            )
            .with_rule(
                Rule::new(
                    "similarity-from-mutual-inheritance",
                    vec![inh(var("X"), var("Y")), inh(var("Y"), var("X"))],
                    sim(var("X"), var("Y")),
                )
                .with_reliability(0.9),
            )
    }

    /// Load a rule set from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over the rules.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }
}

/// A candidate explanation supplied to the abductive strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypothesis {
    pub name: String,
    /// The consequence this hypothesis predicts; it must unify with the
    /// observation for the hypothesis to be considered.
    pub consequence: Pattern,
    /// Prior belief in the hypothesis.
    pub prior: TruthValue,
}

impl Hypothesis {
    pub fn new(name: impl Into<String>, consequence: Pattern, prior: TruthValue) -> Self {
        Self {
            name: name.into(),
            consequence,
            prior,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::NodeKind;

    #[test]
    fn builtin_rules_present() {
        let set = RuleSet::builtin();
        assert_eq!(set.len(), 3);
        assert!(set.rules.iter().any(|r| r.name == "inheritance-transitive"));
        assert!(set.rules.iter().all(|r| r.reliability > 0.0));
    }

    #[test]
    fn reliability_clamped() {
        let rule = Rule::new(
            "r",
            vec![],
            Pattern::node(NodeKind::Concept, "A"),
        )
        .with_reliability(1.5);
        assert!((rule.reliability - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn json_roundtrip() {
        let set = RuleSet::builtin();
        let json = set.to_json().unwrap();
        let back = RuleSet::from_json(&json).unwrap();
        assert_eq!(back.len(), set.len());
        assert_eq!(back.rules[0].name, set.rules[0].name);
        assert_eq!(back.rules[0].conclusion, set.rules[0].conclusion);
    }

    #[test]
    fn rules_are_human_writable_json() {
        let json = r#"{
            "name": "custom",
            "rules": [{
                "name": "pets-are-animals",
                "premises": ["(Inheritance $X (Concept \"Pet\"))"],
                "conclusion": "(Inheritance $X (Concept \"Animal\"))",
                "reliability": 0.8
            }]
        }"#;
        let set = RuleSet::from_json(json).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.rules[0].premises[0].to_string(),
            "(Inheritance $X (Concept \"Pet\"))"
        );
    }

    #[test]
    fn malformed_pattern_in_json_rejected() {
        let json = r#"{
            "name": "bad",
            "rules": [{
                "name": "broken",
                "premises": ["(Inheritance $X"],
                "conclusion": "$Y",
                "reliability": 1.0
            }]
        }"#;
        assert!(RuleSet::from_json(json).is_err());
    }
}
