//! Core atom types for the noema knowledge store.
//!
//! Atoms are the units of the hypergraph: typed nodes carrying a name, and
//! typed links carrying an ordered list of references to other atoms. Every
//! atom is identified by an [`AtomId`] handed out by [`AtomIdAllocator`];
//! links hold ids, never direct references, so cycles in the graph are
//! structurally safe — resolution always goes through the store.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::truth::TruthValue;

/// Unique, niche-optimized identifier for an atom.
///
/// Uses `NonZeroU64` so that `Option<AtomId>` is the same size as `AtomId`
/// (the niche optimization lets the compiler use 0 as the `None` discriminant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct AtomId(NonZeroU64);

impl AtomId {
    /// Create an `AtomId` from a raw `u64`.
    ///
    /// Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(AtomId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Arena slot for this id. Ids start at 1; slots at 0.
    pub(crate) fn slot(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl std::fmt::Display for AtomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "atom:{}", self.0)
    }
}

/// Classification of a node atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A concept in the domain (person, species, category).
    Concept,
    /// A predicate usable as the first target of an Evaluation link.
    Predicate,
    /// A variable node, stored like any other node. Distinct from pattern
    /// variables (`$X`), which are ephemeral and never stored.
    Variable,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Concept => write!(f, "Concept"),
            NodeKind::Predicate => write!(f, "Predicate"),
            NodeKind::Variable => write!(f, "Variable"),
        }
    }
}

/// Declared outgoing arity of a link kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    /// Exactly `n` targets.
    Exactly(usize),
    /// At least `n` targets.
    AtLeast(usize),
}

impl Arity {
    /// Whether `actual` satisfies this arity.
    pub fn accepts(self, actual: usize) -> bool {
        match self {
            Arity::Exactly(n) => actual == n,
            Arity::AtLeast(n) => actual >= n,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Classification of a link atom. Each kind declares a required arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    /// `Inheritance(child, parent)` — "child is-a parent".
    Inheritance,
    /// `Similarity(a, b)` — symmetric resemblance.
    Similarity,
    /// `Evaluation(predicate, arg, ...)` — predicate applied to arguments.
    Evaluation,
    /// Generic untyped link of any positive arity. Spelled `Link` on the
    /// wire, matching the pattern grammar and `Display`.
    #[serde(rename = "Link")]
    Generic,
}

impl LinkKind {
    /// The outgoing arity this kind requires.
    pub fn required_arity(self) -> Arity {
        match self {
            LinkKind::Inheritance | LinkKind::Similarity => Arity::Exactly(2),
            LinkKind::Evaluation => Arity::AtLeast(2),
            LinkKind::Generic => Arity::AtLeast(1),
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkKind::Inheritance => write!(f, "Inheritance"),
            LinkKind::Similarity => write!(f, "Similarity"),
            LinkKind::Evaluation => write!(f, "Evaluation"),
            LinkKind::Generic => write!(f, "Link"),
        }
    }
}

/// The node-or-link payload of an atom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AtomPayload {
    /// A named node.
    Node { kind: NodeKind, name: String },
    /// A link with ordered outgoing references.
    Link {
        kind: LinkKind,
        outgoing: Vec<AtomId>,
    },
}

/// A typed atom with its truth value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Unique identifier, stable for the store's lifetime.
    pub id: AtomId,
    /// Node or link payload.
    pub payload: AtomPayload,
    /// Probabilistic truth value.
    pub truth: TruthValue,
}

impl Atom {
    /// The node name, if this atom is a node.
    pub fn name(&self) -> Option<&str> {
        match &self.payload {
            AtomPayload::Node { name, .. } => Some(name),
            AtomPayload::Link { .. } => None,
        }
    }

    /// The outgoing references, if this atom is a link.
    pub fn outgoing(&self) -> Option<&[AtomId]> {
        match &self.payload {
            AtomPayload::Link { outgoing, .. } => Some(outgoing),
            AtomPayload::Node { .. } => None,
        }
    }

    /// The link kind, if this atom is a link.
    pub fn link_kind(&self) -> Option<LinkKind> {
        match &self.payload {
            AtomPayload::Link { kind, .. } => Some(*kind),
            AtomPayload::Node { .. } => None,
        }
    }

    /// The node kind, if this atom is a node.
    pub fn node_kind(&self) -> Option<NodeKind> {
        match &self.payload {
            AtomPayload::Node { kind, .. } => Some(*kind),
            AtomPayload::Link { .. } => None,
        }
    }

    /// Whether this atom is a link.
    pub fn is_link(&self) -> bool {
        matches!(self.payload, AtomPayload::Link { .. })
    }
}

/// Thread-safe atom id allocator.
///
/// Produces monotonically increasing ids starting from 1. Safe to share
/// across threads; the store owns one.
#[derive(Debug)]
pub struct AtomIdAllocator {
    next: AtomicU64,
}

impl AtomIdAllocator {
    /// Create a new allocator that starts from id 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next atom id.
    pub fn next_id(&self) -> Result<AtomId, StoreError> {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        AtomId::new(raw).ok_or(StoreError::IdExhausted)
    }
}

impl Default for AtomIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_id_niche_optimization() {
        // Option<AtomId> should be the same size as AtomId thanks to NonZeroU64.
        assert_eq!(
            std::mem::size_of::<Option<AtomId>>(),
            std::mem::size_of::<AtomId>()
        );
    }

    #[test]
    fn atom_id_zero_is_none() {
        assert!(AtomId::new(0).is_none());
        assert_eq!(AtomId::new(7).unwrap().get(), 7);
        assert_eq!(AtomId::new(7).unwrap().slot(), 6);
    }

    #[test]
    fn allocator_produces_sequential_ids() {
        let alloc = AtomIdAllocator::new();
        assert_eq!(alloc.next_id().unwrap().get(), 1);
        assert_eq!(alloc.next_id().unwrap().get(), 2);
        assert_eq!(alloc.next_id().unwrap().get(), 3);
    }

    #[test]
    fn link_arities() {
        assert_eq!(LinkKind::Inheritance.required_arity(), Arity::Exactly(2));
        assert_eq!(LinkKind::Similarity.required_arity(), Arity::Exactly(2));
        assert_eq!(LinkKind::Evaluation.required_arity(), Arity::AtLeast(2));
        assert_eq!(LinkKind::Generic.required_arity(), Arity::AtLeast(1));
    }

    #[test]
    fn arity_accepts() {
        assert!(Arity::Exactly(2).accepts(2));
        assert!(!Arity::Exactly(2).accepts(3));
        assert!(Arity::AtLeast(2).accepts(2));
        assert!(Arity::AtLeast(2).accepts(5));
        assert!(!Arity::AtLeast(2).accepts(1));
    }

    #[test]
    fn payload_accessors() {
        let node = Atom {
            id: AtomId::new(1).unwrap(),
            payload: AtomPayload::Node {
                kind: NodeKind::Concept,
                name: "Sun".into(),
            },
            truth: TruthValue::CERTAIN,
        };
        assert_eq!(node.name(), Some("Sun"));
        assert_eq!(node.node_kind(), Some(NodeKind::Concept));
        assert!(node.outgoing().is_none());
        assert!(!node.is_link());

        let link = Atom {
            id: AtomId::new(2).unwrap(),
            payload: AtomPayload::Link {
                kind: LinkKind::Generic,
                outgoing: vec![node.id],
            },
            truth: TruthValue::CERTAIN,
        };
        assert!(link.is_link());
        assert_eq!(link.link_kind(), Some(LinkKind::Generic));
        assert_eq!(link.outgoing().unwrap(), &[node.id]);
    }

    #[test]
    fn display_forms() {
        assert_eq!(AtomId::new(42).unwrap().to_string(), "atom:42");
        assert_eq!(LinkKind::Generic.to_string(), "Link");
        assert_eq!(NodeKind::Predicate.to_string(), "Predicate");
    }

    #[test]
    fn generic_link_kind_wire_form_is_link() {
        // The JSON spelling must agree with Display and the pattern grammar.
        assert_eq!(serde_json::to_string(&LinkKind::Generic).unwrap(), "\"Link\"");
        let parsed: LinkKind = serde_json::from_str("\"Link\"").unwrap();
        assert_eq!(parsed, LinkKind::Generic);
    }
}
