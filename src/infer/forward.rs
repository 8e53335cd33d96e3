//! Forward chaining: saturate the premise set under the rule base.
//!
//! Facts are ground links. Each iteration tries every rule against the
//! current fact base, joining premise patterns left to right over a shared
//! binding map, and adds any new conclusions. The loop stops at fixpoint,
//! or flags `bound_reached` when `max_steps`, `max_results`, or the timeout
//! cuts it short.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, trace};

use crate::atom::{AtomId, LinkKind};
use crate::error::InferError;
use crate::infer::{Conclusion, ForwardInput, ForwardResult, InferResult, InferenceParams};
use crate::pattern::matcher::{PatternMatcher, Substitution, apply, reify};
use crate::pattern::{Bindings, Pattern};
use crate::store::AtomStore;
use crate::truth::TruthValue;

/// A ground link in the working fact base.
#[derive(Debug, Clone)]
struct GroundFact {
    kind: LinkKind,
    outgoing: Vec<AtomId>,
    truth: TruthValue,
}

pub(crate) fn run(
    store: &AtomStore,
    params: &InferenceParams,
    input: &ForwardInput,
) -> InferResult<ForwardResult> {
    if input.premises.is_empty() {
        return Err(InferError::NoPremises);
    }

    let matcher = PatternMatcher::new(store);
    let started = Instant::now();

    // Seed the fact base from the premise links. Node premises contribute
    // nothing chainable and are skipped.
    let mut facts: Vec<GroundFact> = Vec::new();
    let mut seen: HashMap<(LinkKind, Vec<AtomId>), usize> = HashMap::new();
    for &id in &input.premises {
        let atom = store.get(id)?;
        if let (Some(kind), Some(outgoing)) = (atom.link_kind(), atom.outgoing()) {
            let key = (kind, outgoing.to_vec());
            if !seen.contains_key(&key) {
                seen.insert(key, facts.len());
                facts.push(GroundFact {
                    kind,
                    outgoing: outgoing.to_vec(),
                    truth: atom.truth,
                });
            }
        }
    }

    let mut conclusions: Vec<Conclusion> = Vec::new();
    let mut steps = 0;
    let mut bound_reached = false;

    'outer: for step in 1..=params.max_steps {
        if let Some(budget) = params.timeout {
            if started.elapsed() >= budget {
                bound_reached = true;
                break;
            }
        }
        steps = step;
        let mut derived_this_step = false;
        let frontier = facts.len();

        for rule in input.rules.iter() {
            let mut matches = Vec::new();
            join_premises(
                &matcher,
                store,
                &rule.premises,
                &facts[..frontier],
                Bindings::new(),
                TruthValue::CERTAIN,
                &mut matches,
            );

            for (bindings, premise_truth) in matches {
                let Some((kind, outgoing)) =
                    instantiate(&matcher, store, &rule.conclusion, &bindings)
                else {
                    continue;
                };
                let truth = premise_truth.scale(rule.reliability);
                let confidence = truth.confidence;
                if confidence < params.confidence_threshold {
                    trace!(rule = %rule.name, confidence, "conclusion below threshold");
                    continue;
                }
                let key = (kind, outgoing.clone());
                if seen.contains_key(&key) {
                    continue;
                }
                debug!(rule = %rule.name, step, confidence, "derived conclusion");
                seen.insert(key, facts.len());
                facts.push(GroundFact {
                    kind,
                    outgoing: outgoing.clone(),
                    truth,
                });
                conclusions.push(Conclusion {
                    kind,
                    outgoing,
                    confidence,
                    rule: rule.name.clone(),
                    step,
                });
                derived_this_step = true;
                if conclusions.len() >= params.max_results {
                    bound_reached = true;
                    break 'outer;
                }
            }
        }

        if !derived_this_step {
            // Fixpoint: nothing new can be derived.
            break;
        }
        if step == params.max_steps {
            bound_reached = true;
        }
    }

    Ok(ForwardResult {
        steps,
        conclusions,
        bound_reached,
    })
}

/// Joins the rule's premises left to right against the fact base, threading
/// the binding map and the conjunction of consumed fact truths.
fn join_premises(
    matcher: &PatternMatcher<'_>,
    store: &AtomStore,
    premises: &[Pattern],
    facts: &[GroundFact],
    bindings: Bindings,
    truth: TruthValue,
    out: &mut Vec<(Bindings, TruthValue)>,
) {
    let Some((first, rest)) = premises.split_first() else {
        out.push((bindings, truth));
        return;
    };
    for fact in facts {
        let mut trial = bindings.clone();
        if match_fact(matcher, store, first, fact, &mut trial) {
            join_premises(
                matcher,
                store,
                rest,
                facts,
                trial,
                truth.conjunction(&fact.truth),
                out,
            );
        }
    }
}

/// Matches a premise pattern against one ground fact.
fn match_fact(
    matcher: &PatternMatcher<'_>,
    store: &AtomStore,
    premise: &Pattern,
    fact: &GroundFact,
    bindings: &mut Bindings,
) -> bool {
    let Pattern::Link { kind, children } = premise else {
        return false;
    };
    if *kind != fact.kind || children.len() != fact.outgoing.len() {
        return false;
    }
    for (child, &target) in children.iter().zip(&fact.outgoing) {
        match child {
            Pattern::Variable(name) => match bindings.get(name) {
                Some(&bound) if bound != target => return false,
                Some(_) => {}
                None => {
                    bindings.insert(name.clone(), target);
                }
            },
            Pattern::Node { kind, name } => {
                let Ok(atom) = store.get(target) else {
                    return false;
                };
                if atom.node_kind() != Some(*kind) || atom.name() != Some(name.as_str()) {
                    return false;
                }
            }
            nested @ Pattern::Link { .. } => {
                if !matcher.match_atom(nested, target, bindings) {
                    return false;
                }
            }
        }
    }
    true
}

/// Turns a conclusion pattern into a ground link under the bindings.
/// Returns `None` when a child cannot be resolved to a store atom, or when
/// a nested sub-pattern stays non-ground under the bindings.
fn instantiate(
    matcher: &PatternMatcher<'_>,
    store: &AtomStore,
    conclusion: &Pattern,
    bindings: &Bindings,
) -> Option<(LinkKind, Vec<AtomId>)> {
    let Pattern::Link { kind, children } = conclusion else {
        return None;
    };
    // Reify the bindings once so nested sub-patterns resolve to the atoms
    // the premises actually bound, not the first structural match.
    let subst: Substitution = bindings
        .iter()
        .filter_map(|(name, &id)| Some((name.clone(), reify(store, id)?)))
        .collect();
    let mut outgoing = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Pattern::Variable(name) => outgoing.push(bindings.get(name).copied()?),
            other => {
                let grounded = apply(&subst, other);
                if !grounded.is_ground() {
                    return None;
                }
                let entries = matcher.matches_entries(&grounded, 1);
                let (id, _) = entries.into_iter().next()?;
                outgoing.push(id);
            }
        }
    }
    Some((*kind, outgoing))
}
