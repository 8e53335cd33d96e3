//! Probabilistic inference over an explicit dependency graph.
//!
//! Facts are graph nodes; a dependency `premise -> conclusion` carries the
//! conditional `P(conclusion | premise)`. Roots carry priors. Each
//! propagation round computes every fact whose parents are all known as
//! the product of `parent probability x conditional` over incoming edges,
//! and stops once a round changes nothing. A fact with neither a prior nor
//! an incoming dependency is underivable and rejected up front.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::atom::AtomId;
use crate::error::InferError;
use crate::infer::{
    InferResult, Inference, InferenceParams, ProbabilisticInput, ProbabilisticResult,
};
use crate::store::AtomStore;

const CONVERGENCE_EPSILON: f32 = 1e-6;

pub(crate) fn run(
    store: &AtomStore,
    params: &InferenceParams,
    input: &ProbabilisticInput,
) -> InferResult<ProbabilisticResult> {
    let mut graph: DiGraph<AtomId, f32> = DiGraph::new();
    let mut index: HashMap<AtomId, NodeIndex> = HashMap::new();

    let mut node_of = |graph: &mut DiGraph<AtomId, f32>, atom: AtomId| {
        *index.entry(atom).or_insert_with(|| graph.add_node(atom))
    };

    // Every referenced atom must exist in the store.
    let mut priors: HashMap<NodeIndex, f32> = HashMap::new();
    for fact in &input.facts {
        store.get(fact.atom)?;
        let node = node_of(&mut graph, fact.atom);
        if let Some(prior) = fact.prior {
            priors.insert(node, prior.clamp(0.0, 1.0));
        }
    }
    for dep in &input.dependencies {
        store.get(dep.premise)?;
        store.get(dep.conclusion)?;
        let premise = node_of(&mut graph, dep.premise);
        let conclusion = node_of(&mut graph, dep.conclusion);
        graph.add_edge(premise, conclusion, dep.conditional.clamp(0.0, 1.0));
    }

    // A fact with no prior and nothing pointing at it can never get a
    // probability.
    for fact in &input.facts {
        let node = index[&fact.atom];
        if fact.prior.is_none()
            && graph
                .neighbors_directed(node, Direction::Incoming)
                .next()
                .is_none()
        {
            return Err(InferError::UnderivableFact {
                atom: fact.atom.get(),
            });
        }
    }

    let mut probabilities: HashMap<NodeIndex, f32> = priors.clone();
    let mut rounds = 0;
    let mut bound_reached = false;

    for round in 1..=params.max_steps {
        rounds = round;
        let mut max_delta = 0.0f32;
        for node in graph.node_indices() {
            if priors.contains_key(&node) {
                continue; // priors are given, not recomputed
            }
            let mut product = 1.0f32;
            let mut all_known = true;
            let mut has_parents = false;
            for edge in graph.edges_directed(node, Direction::Incoming) {
                has_parents = true;
                match probabilities.get(&edge.source()) {
                    Some(parent) => product *= parent * edge.weight(),
                    None => {
                        all_known = false;
                        break;
                    }
                }
            }
            if !has_parents || !all_known {
                continue;
            }
            let previous = probabilities.get(&node).copied();
            let delta = (product - previous.unwrap_or(0.0)).abs();
            if previous.is_none() || delta > CONVERGENCE_EPSILON {
                max_delta = max_delta.max(delta.max(CONVERGENCE_EPSILON * 2.0));
                probabilities.insert(node, product);
            }
        }
        if max_delta <= CONVERGENCE_EPSILON {
            debug!(round, "probability propagation converged");
            break;
        }
        if round == params.max_steps {
            bound_reached = true;
        }
    }

    // Derived facts only: priors were inputs, not inferences.
    let mut inferences = Vec::new();
    for fact in &input.facts {
        if fact.prior.is_some() {
            continue;
        }
        if inferences.len() >= params.max_results {
            bound_reached = true;
            break;
        }
        if let Some(&probability) = probabilities.get(&index[&fact.atom]) {
            inferences.push(Inference {
                atom: fact.atom,
                probability,
                uncertainty: 1.0 - probability,
            });
        }
    }

    Ok(ProbabilisticResult {
        inferences,
        rounds,
        bound_reached,
    })
}
