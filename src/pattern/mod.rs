//! Patterns: structural templates with free variables.
//!
//! A pattern is a tree of literal atom specifications and `$`-prefixed
//! variables, written in a constrained s-expression grammar:
//!
//! ```text
//! (Inheritance (Concept "Human") $X)
//! (Evaluation (Predicate "eats") $Who (Concept "Meat"))
//! ```
//!
//! Patterns are ephemeral — they are parsed, matched against the store, and
//! discarded; they are never stored as atoms. Matching a pattern yields
//! [`Bindings`] mapping each variable name (without the `$` sigil) to the
//! atom id it unified with.

pub mod matcher;
pub mod parse;

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::atom::{AtomId, LinkKind, NodeKind};
use crate::error::PatternError;

/// A mapping from variable name to atom id, produced by matching.
///
/// `BTreeMap` keeps iteration deterministic for display and tests.
pub type Bindings = BTreeMap<String, AtomId>;

/// A structural template matched against stored atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// A free variable, written `$NAME`. The stored string omits the sigil.
    Variable(String),
    /// A literal node specification.
    Node { kind: NodeKind, name: String },
    /// A link specification whose children are themselves patterns.
    Link {
        kind: LinkKind,
        children: Vec<Pattern>,
    },
}

impl Pattern {
    /// Shorthand for a variable pattern.
    pub fn var(name: impl Into<String>) -> Self {
        Pattern::Variable(name.into())
    }

    /// Shorthand for a literal node pattern.
    pub fn node(kind: NodeKind, name: impl Into<String>) -> Self {
        Pattern::Node {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for a link pattern.
    pub fn link(kind: LinkKind, children: Vec<Pattern>) -> Self {
        Pattern::Link { kind, children }
    }

    /// Whether the given variable occurs anywhere in this pattern.
    pub fn contains_var(&self, name: &str) -> bool {
        match self {
            Pattern::Variable(v) => v == name,
            Pattern::Node { .. } => false,
            Pattern::Link { children, .. } => children.iter().any(|c| c.contains_var(name)),
        }
    }

    /// Whether this pattern contains any variable at all.
    pub fn is_ground(&self) -> bool {
        match self {
            Pattern::Variable(_) => false,
            Pattern::Node { .. } => true,
            Pattern::Link { children, .. } => children.iter().all(Pattern::is_ground),
        }
    }

    /// Rename every variable through `f`. Used to standardize rule variables
    /// apart from goal variables before unification.
    pub fn rename_vars(&self, f: &impl Fn(&str) -> String) -> Pattern {
        match self {
            Pattern::Variable(v) => Pattern::Variable(f(v)),
            Pattern::Node { kind, name } => Pattern::Node {
                kind: *kind,
                name: name.clone(),
            },
            Pattern::Link { kind, children } => Pattern::Link {
                kind: *kind,
                children: children.iter().map(|c| c.rename_vars(f)).collect(),
            },
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pattern::Variable(v) => write!(f, "${v}"),
            Pattern::Node { kind, name } => write!(f, "({kind} \"{name}\")"),
            Pattern::Link { kind, children } => {
                write!(f, "({kind}")?;
                for child in children {
                    write!(f, " {child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl std::str::FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse(s)
    }
}

// Patterns serialize in their s-expression text form so rule files stay
// human-writable.
impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
