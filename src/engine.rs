//! High-level engine facade.
//!
//! [`Engine`] owns the atom store and the configured inference bounds, and
//! exposes the whole surface — atoms, pattern matching, inference, and
//! knowledge base files — behind [`NoemaResult`].

use std::path::Path;

use tracing::{info, warn};

use crate::atom::{Atom, AtomId, LinkKind, NodeKind};
use crate::config::NoemaConfig;
use crate::error::{NoemaError, NoemaResult};
use crate::infer::engine::InferenceEngine;
use crate::infer::{InferenceParams, Strategy, StrategyInput, StrategyResult};
use crate::load::{self, KbFile, LoadStats};
use crate::pattern::matcher::PatternMatcher;
use crate::pattern::{Bindings, Pattern};
use crate::store::AtomStore;
use crate::truth::TruthValue;

/// One entry in a batch assertion.
#[derive(Debug, Clone)]
pub enum AtomSpec {
    Node {
        kind: NodeKind,
        name: String,
        truth: TruthValue,
    },
    Link {
        kind: LinkKind,
        outgoing: Vec<AtomId>,
        truth: TruthValue,
    },
}

/// How a batch assertion treats individual failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Stop at the first failure; nothing after it is attempted.
    Strict,
    /// Skip failures and keep going; they are reported in the outcome.
    Tolerant,
}

/// What a tolerant batch assertion accomplished.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Ids of the atoms added, in batch order (failures leave gaps).
    pub added: Vec<AtomId>,
    /// Failed entries as (batch index, error).
    pub failures: Vec<(usize, NoemaError)>,
}

/// The engine: an atom store plus configured inference bounds.
#[derive(Default)]
pub struct Engine {
    store: AtomStore,
    params: InferenceParams,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &NoemaConfig) -> Self {
        Self {
            store: AtomStore::new(),
            params: config.params(),
        }
    }

    pub fn store(&self) -> &AtomStore {
        &self.store
    }

    pub fn params(&self) -> &InferenceParams {
        &self.params
    }

    // -- atoms -------------------------------------------------------------

    pub fn add_concept(&self, name: impl Into<String>, truth: TruthValue) -> NoemaResult<AtomId> {
        Ok(self.store.add_node(NodeKind::Concept, name, truth)?)
    }

    pub fn add_predicate(&self, name: impl Into<String>, truth: TruthValue) -> NoemaResult<AtomId> {
        Ok(self.store.add_node(NodeKind::Predicate, name, truth)?)
    }

    pub fn add_node(
        &self,
        kind: NodeKind,
        name: impl Into<String>,
        truth: TruthValue,
    ) -> NoemaResult<AtomId> {
        Ok(self.store.add_node(kind, name, truth)?)
    }

    pub fn add_link(
        &self,
        kind: LinkKind,
        outgoing: Vec<AtomId>,
        truth: TruthValue,
    ) -> NoemaResult<AtomId> {
        Ok(self.store.add_link(kind, outgoing, truth)?)
    }

    pub fn get_atom(&self, id: AtomId) -> NoemaResult<Atom> {
        Ok(self.store.get(id)?)
    }

    pub fn find_by_name(&self, name: &str) -> Vec<AtomId> {
        self.store.find_by_name(name)
    }

    pub fn get_truth(&self, id: AtomId) -> NoemaResult<TruthValue> {
        Ok(self.store.get_truth(id)?)
    }

    /// Replace an atom's truth value, returning the previous one.
    pub fn set_truth(&self, id: AtomId, truth: TruthValue) -> NoemaResult<TruthValue> {
        Ok(self.store.set_truth(id, truth)?)
    }

    /// Merge new evidence into an atom's truth value via revision,
    /// returning the revised value.
    pub fn revise_truth(&self, id: AtomId, evidence: TruthValue) -> NoemaResult<TruthValue> {
        let current = self.store.get_truth(id)?;
        let revised = current.revision(&evidence);
        self.store.set_truth(id, revised)?;
        Ok(revised)
    }

    /// Assert a batch of atoms. Strict mode stops at the first failure;
    /// tolerant mode skips failures and reports them in the outcome.
    pub fn assert_batch(
        &self,
        specs: Vec<AtomSpec>,
        mode: FailureMode,
    ) -> NoemaResult<BatchOutcome> {
        let mut outcome = BatchOutcome {
            added: Vec::new(),
            failures: Vec::new(),
        };
        for (index, spec) in specs.into_iter().enumerate() {
            let result = match spec {
                AtomSpec::Node { kind, name, truth } => self.add_node(kind, name, truth),
                AtomSpec::Link {
                    kind,
                    outgoing,
                    truth,
                } => self.add_link(kind, outgoing, truth),
            };
            match result {
                Ok(id) => outcome.added.push(id),
                Err(error) => match mode {
                    FailureMode::Strict => return Err(error),
                    FailureMode::Tolerant => {
                        warn!(index, %error, "skipping failed batch entry");
                        outcome.failures.push((index, error));
                    }
                },
            }
        }
        Ok(outcome)
    }

    // -- patterns ----------------------------------------------------------

    /// Parse a pattern from its textual form.
    pub fn parse_pattern(&self, text: &str) -> NoemaResult<Pattern> {
        Ok(text.parse::<Pattern>()?)
    }

    /// Parse and match a textual pattern against the store.
    pub fn match_pattern(&self, text: &str, max_results: usize) -> NoemaResult<Vec<Bindings>> {
        let pattern: Pattern = text.parse()?;
        Ok(PatternMatcher::new(&self.store).matches(&pattern, max_results))
    }

    // -- inference ---------------------------------------------------------

    /// Run a strategy with the engine's configured bounds.
    pub fn infer(&self, input: &StrategyInput) -> NoemaResult<StrategyResult> {
        self.infer_with(&self.params, input)
    }

    /// Run a strategy with explicit bounds.
    pub fn infer_with(
        &self,
        params: &InferenceParams,
        input: &StrategyInput,
    ) -> NoemaResult<StrategyResult> {
        Ok(InferenceEngine::new(&self.store).infer(params, input)?)
    }

    /// Resolve a strategy name, rejecting unknown ones.
    pub fn strategy_from_name(name: &str) -> NoemaResult<Strategy> {
        Ok(name.parse::<Strategy>()?)
    }

    // -- knowledge base files ----------------------------------------------

    pub fn load_kb(&self, path: impl AsRef<Path>) -> NoemaResult<LoadStats> {
        Ok(load::load_file(&self.store, path)?)
    }

    pub fn load_kb_json(&self, json: &str) -> NoemaResult<LoadStats> {
        Ok(KbFile::from_json(json)?.apply(&self.store)?)
    }

    pub fn export_kb(&self, path: impl AsRef<Path>) -> NoemaResult<()> {
        let path = path.as_ref();
        load::export_file(&self.store, path)?;
        info!(path = %path.display(), atoms = self.store.len(), "exported knowledge base");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tv(c: f32) -> TruthValue {
        TruthValue::new(1.0, c).unwrap()
    }

    #[test]
    fn batch_strict_stops_at_first_failure() {
        let engine = Engine::new();
        let a = engine.add_concept("a", tv(1.0)).unwrap();
        let err = engine.assert_batch(
            vec![
                AtomSpec::Link {
                    kind: LinkKind::Inheritance,
                    outgoing: vec![a], // wrong arity
                    truth: tv(1.0),
                },
                AtomSpec::Node {
                    kind: NodeKind::Concept,
                    name: "never-added".into(),
                    truth: tv(1.0),
                },
            ],
            FailureMode::Strict,
        );
        assert!(err.is_err());
        assert!(engine.find_by_name("never-added").is_empty());
    }

    #[test]
    fn batch_tolerant_skips_failures() {
        let engine = Engine::new();
        let a = engine.add_concept("a", tv(1.0)).unwrap();
        let outcome = engine
            .assert_batch(
                vec![
                    AtomSpec::Link {
                        kind: LinkKind::Inheritance,
                        outgoing: vec![a],
                        truth: tv(1.0),
                    },
                    AtomSpec::Node {
                        kind: NodeKind::Concept,
                        name: "survivor".into(),
                        truth: tv(1.0),
                    },
                ],
                FailureMode::Tolerant,
            )
            .unwrap();
        assert_eq!(outcome.added.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, 0);
        assert_eq!(engine.find_by_name("survivor").len(), 1);
    }

    #[test]
    fn match_pattern_parses_and_matches() {
        let engine = Engine::new();
        let h = engine.add_concept("Human", tv(1.0)).unwrap();
        let a = engine.add_concept("Animal", tv(1.0)).unwrap();
        engine
            .add_link(LinkKind::Inheritance, vec![h, a], tv(0.9))
            .unwrap();

        let bindings = engine
            .match_pattern("(Inheritance $x (Concept \"Animal\"))", 10)
            .unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].get("x"), Some(&h));
    }

    #[test]
    fn revision_merges_evidence() {
        let engine = Engine::new();
        let id = engine
            .add_concept("sky-is-blue", TruthValue::new(0.8, 0.5).unwrap())
            .unwrap();
        let revised = engine
            .revise_truth(id, TruthValue::new(0.6, 0.5).unwrap())
            .unwrap();
        // Equal confidence: strengths average; confidence never degrades.
        assert!((revised.strength - 0.7).abs() < 1e-6);
        assert!((revised.confidence - 0.5).abs() < 1e-6);
        assert_eq!(engine.get_truth(id).unwrap(), revised);
    }

    #[test]
    fn malformed_pattern_surfaces_a_pattern_error() {
        let engine = Engine::new();
        let err = engine.match_pattern("(Inheritance", 10).unwrap_err();
        assert!(matches!(err, NoemaError::Pattern(_)));
    }

    #[test]
    fn unknown_strategy_is_rejected_by_name() {
        assert!(Engine::strategy_from_name("forward").is_ok());
        assert!(matches!(
            Engine::strategy_from_name("divination"),
            Err(NoemaError::Infer(_))
        ));
    }
}
