//! Structural unification of patterns against the atom store.
//!
//! Matching is deterministic for a fixed store state: candidates are
//! enumerated in store insertion order under a single read guard, with no
//! up-front snapshot, and results are capped at `max_results` with early
//! exit — once the cap is reached the rest of the store is not traversed.
//!
//! Also provides pattern-to-pattern unification ([`unify`]), used by
//! backward chaining (goal vs rule conclusion) and abduction (observation
//! vs hypothesis consequence), where variables may occur on both sides.

use std::collections::BTreeMap;

use crate::atom::{Atom, AtomId, AtomPayload};
use crate::store::AtomStore;

use super::{Bindings, Pattern};

/// Read-only unification engine over an [`AtomStore`].
pub struct PatternMatcher<'a> {
    store: &'a AtomStore,
}

impl<'a> PatternMatcher<'a> {
    pub fn new(store: &'a AtomStore) -> Self {
        Self { store }
    }

    /// All consistent binding sets for `pattern`, at most `max_results`.
    pub fn matches(&self, pattern: &Pattern, max_results: usize) -> Vec<Bindings> {
        self.matches_entries(pattern, max_results)
            .into_iter()
            .map(|(_, bindings)| bindings)
            .collect()
    }

    /// Like [`matches`](Self::matches), but also reports which atom each
    /// binding set was rooted at.
    pub fn matches_entries(
        &self,
        pattern: &Pattern,
        max_results: usize,
    ) -> Vec<(AtomId, Bindings)> {
        let mut results = Vec::new();
        if max_results == 0 {
            return results;
        }
        self.store.read_scan(|arena| {
            for atom in arena {
                let mut bindings = Bindings::new();
                if match_in(arena, pattern, atom.id, &mut bindings) {
                    results.push((atom.id, bindings));
                    if results.len() >= max_results {
                        break;
                    }
                }
            }
        });
        results
    }

    /// Match `pattern` against one concrete atom, extending `bindings`.
    ///
    /// A variable already bound must re-bind to the same atom id; an unbound
    /// variable binds to the candidate. For links, every outgoing slot must
    /// match the corresponding child pattern; the first inconsistent slot
    /// fails the whole candidate. On failure `bindings` may hold partial
    /// entries — callers discard it with the candidate.
    pub fn match_atom(&self, pattern: &Pattern, id: AtomId, bindings: &mut Bindings) -> bool {
        self.store
            .read_scan(|arena| match_in(arena, pattern, id, bindings))
    }
}

/// Match one candidate against the arena slice, resolving outgoing targets
/// in place rather than cloning atoms out of the store.
fn match_in(arena: &[Atom], pattern: &Pattern, id: AtomId, bindings: &mut Bindings) -> bool {
    let Some(atom) = arena.get(id.slot()) else {
        return false;
    };
    match pattern {
        Pattern::Variable(name) => match bindings.get(name) {
            Some(&bound) => bound == id,
            None => {
                bindings.insert(name.clone(), id);
                true
            }
        },
        Pattern::Node { kind, name } => match &atom.payload {
            AtomPayload::Node {
                kind: atom_kind,
                name: atom_name,
            } => atom_kind == kind && atom_name == name,
            AtomPayload::Link { .. } => false,
        },
        Pattern::Link { kind, children } => match &atom.payload {
            AtomPayload::Link {
                kind: atom_kind,
                outgoing,
            } => {
                atom_kind == kind
                    && outgoing.len() == children.len()
                    && children
                        .iter()
                        .zip(outgoing.iter())
                        .all(|(child, &target)| match_in(arena, child, target, bindings))
            }
            AtomPayload::Node { .. } => false,
        },
    }
}

// ---------------------------------------------------------------------------
// Pattern-to-pattern unification
// ---------------------------------------------------------------------------

/// A substitution from variable names to patterns.
pub type Substitution = BTreeMap<String, Pattern>;

/// Resolve a pattern through the substitution until it is not a bound variable.
fn walk<'p>(pattern: &'p Pattern, subst: &'p Substitution) -> &'p Pattern {
    let mut current = pattern;
    while let Pattern::Variable(name) = current {
        match subst.get(name) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// Unify two patterns, both of which may contain variables.
///
/// Returns the most general substitution making them equal, or `None` if
/// they cannot be unified. An occurs check prevents a variable from binding
/// to a pattern containing itself.
pub fn unify(a: &Pattern, b: &Pattern) -> Option<Substitution> {
    let mut subst = Substitution::new();
    if unify_into(a, b, &mut subst) {
        Some(subst)
    } else {
        None
    }
}

fn unify_into(a: &Pattern, b: &Pattern, subst: &mut Substitution) -> bool {
    let a = walk(a, subst).clone();
    let b = walk(b, subst).clone();
    match (&a, &b) {
        (Pattern::Variable(va), Pattern::Variable(vb)) if va == vb => true,
        (Pattern::Variable(v), other) | (other, Pattern::Variable(v)) => {
            if other.contains_var(v) {
                return false; // occurs check
            }
            subst.insert(v.clone(), other.clone());
            true
        }
        (
            Pattern::Node { kind: ka, name: na },
            Pattern::Node { kind: kb, name: nb },
        ) => ka == kb && na == nb,
        (
            Pattern::Link {
                kind: ka,
                children: ca,
            },
            Pattern::Link {
                kind: kb,
                children: cb,
            },
        ) => {
            ka == kb
                && ca.len() == cb.len()
                && ca
                    .iter()
                    .zip(cb.iter())
                    .all(|(x, y)| unify_into(x, y, subst))
        }
        _ => false,
    }
}

/// Turn a store atom back into the ground pattern that matches exactly it.
/// `None` when the id (or one of its outgoing targets) is not in the store.
pub fn reify(store: &AtomStore, id: AtomId) -> Option<Pattern> {
    let atom = store.get(id).ok()?;
    if let (Some(kind), Some(name)) = (atom.node_kind(), atom.name()) {
        return Some(Pattern::node(kind, name));
    }
    let kind = atom.link_kind()?;
    let children = atom
        .outgoing()?
        .iter()
        .map(|&child| reify(store, child))
        .collect::<Option<Vec<_>>>()?;
    Some(Pattern::Link { kind, children })
}

/// Apply a substitution to a pattern, resolving chains of variable bindings.
pub fn apply(subst: &Substitution, pattern: &Pattern) -> Pattern {
    match pattern {
        Pattern::Variable(name) => match subst.get(name) {
            Some(bound) => apply(subst, bound),
            None => pattern.clone(),
        },
        Pattern::Node { .. } => pattern.clone(),
        Pattern::Link { kind, children } => Pattern::Link {
            kind: *kind,
            children: children.iter().map(|c| apply(subst, c)).collect(),
        },
    }
}
