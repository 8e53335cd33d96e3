//! The atom store: an arena of typed atoms with a name index.
//!
//! Atoms live in a single owning table addressed by [`AtomId`]; links
//! reference other atoms only by id. Reads take `&self` and may run
//! concurrently; mutation (`add_node`, `add_link`, `set_truth`) must be
//! serialized by the caller — the interior `RwLock` makes interleaved
//! access safe, but the single-writer discipline is part of the contract.
//!
//! All mutations are atomic: an operation that fails validation leaves the
//! store untouched.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::atom::{Atom, AtomId, AtomIdAllocator, AtomPayload, LinkKind, NodeKind};
use crate::error::StoreError;
use crate::truth::TruthValue;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Default)]
struct StoreInner {
    /// Arena in insertion order; slot = id − 1.
    arena: Vec<Atom>,
    /// Node name → atom ids, each list in insertion order.
    name_index: HashMap<String, Vec<AtomId>>,
}

/// Owning store for all atoms of one knowledge base.
pub struct AtomStore {
    inner: RwLock<StoreInner>,
    allocator: AtomIdAllocator,
}

impl AtomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            allocator: AtomIdAllocator::new(),
        }
    }

    /// Add a named node atom. Returns its fresh id.
    pub fn add_node(
        &self,
        kind: NodeKind,
        name: impl Into<String>,
        truth: TruthValue,
    ) -> StoreResult<AtomId> {
        // Re-validate: TruthValue construction validates, but callers can
        // build one from raw struct syntax.
        TruthValue::new(truth.strength, truth.confidence)?;
        let name = name.into();

        let mut inner = self.inner.write().expect("store lock poisoned");
        let id = self.allocator.next_id()?;
        inner.arena.push(Atom {
            id,
            payload: AtomPayload::Node {
                kind,
                name: name.clone(),
            },
            truth,
        });
        inner.name_index.entry(name).or_default().push(id);
        tracing::debug!(%id, %kind, "added node");
        Ok(id)
    }

    /// Add a link atom with ordered outgoing references. Returns its fresh id.
    ///
    /// Fails with `InvalidArity` if the outgoing length does not satisfy the
    /// kind's declared arity, and with `DanglingReference` if any target id
    /// is unknown. On failure nothing is inserted.
    pub fn add_link(
        &self,
        kind: LinkKind,
        outgoing: Vec<AtomId>,
        truth: TruthValue,
    ) -> StoreResult<AtomId> {
        TruthValue::new(truth.strength, truth.confidence)?;

        let required = kind.required_arity();
        if !required.accepts(outgoing.len()) {
            return Err(StoreError::InvalidArity {
                kind: kind.to_string(),
                expected: required.to_string(),
                actual: outgoing.len(),
            });
        }

        let mut inner = self.inner.write().expect("store lock poisoned");
        for &target in &outgoing {
            if target.slot() >= inner.arena.len() {
                return Err(StoreError::DanglingReference {
                    target: target.get(),
                });
            }
        }

        let id = self.allocator.next_id()?;
        inner.arena.push(Atom {
            id,
            payload: AtomPayload::Link { kind, outgoing },
            truth,
        });
        tracing::debug!(%id, %kind, "added link");
        Ok(id)
    }

    /// Get a clone of the atom with the given id.
    pub fn get(&self, id: AtomId) -> StoreResult<Atom> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .arena
            .get(id.slot())
            .cloned()
            .ok_or(StoreError::NotFound { id: id.get() })
    }

    /// All atom ids sharing the given node name, in insertion order.
    pub fn find_by_name(&self, name: &str) -> Vec<AtomId> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.name_index.get(name).cloned().unwrap_or_default()
    }

    /// Get an atom's truth value.
    pub fn get_truth(&self, id: AtomId) -> StoreResult<TruthValue> {
        Ok(self.get(id)?.truth)
    }

    /// Replace an atom's truth value, returning the previous one so callers
    /// can audit or roll back.
    pub fn set_truth(&self, id: AtomId, truth: TruthValue) -> StoreResult<TruthValue> {
        TruthValue::new(truth.strength, truth.confidence)?;
        let mut inner = self.inner.write().expect("store lock poisoned");
        let atom = inner
            .arena
            .get_mut(id.slot())
            .ok_or(StoreError::NotFound { id: id.get() })?;
        let old = atom.truth;
        atom.truth = truth;
        Ok(old)
    }

    /// Number of atoms.
    pub fn len(&self) -> usize {
        self.inner.read().expect("store lock poisoned").arena.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all atoms in insertion order.
    pub fn atoms(&self) -> Vec<Atom> {
        self.inner.read().expect("store lock poisoned").arena.clone()
    }

    /// Run a closure over the arena under the read guard, without cloning.
    /// The closure must not call back into the store.
    pub fn read_scan<R>(&self, f: impl FnOnce(&[Atom]) -> R) -> R {
        let inner = self.inner.read().expect("store lock poisoned");
        f(&inner.arena)
    }

    /// All atom ids in insertion order.
    pub fn atom_ids(&self) -> Vec<AtomId> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.arena.iter().map(|a| a.id).collect()
    }

    /// All link atom ids in insertion order.
    pub fn link_ids(&self) -> Vec<AtomId> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .arena
            .iter()
            .filter(|a| a.is_link())
            .map(|a| a.id)
            .collect()
    }
}

impl Default for AtomStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AtomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomStore")
            .field("atoms", &self.len())
            .finish()
    }
}
