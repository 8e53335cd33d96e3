//! Temporal reasoning over interval-tagged facts.
//!
//! Each timed fact spans `[start, start + duration]`. Pairwise Allen
//! relations are computed from the timestamps; caller-asserted relations
//! are then checked against them. Contradictory assertions for one pair,
//! or an assertion disagreeing with the computed relation, are violations;
//! assertions naming atoms without timed facts are warnings.

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use crate::atom::AtomId;
use crate::infer::{
    InferResult, InferenceParams, IntervalRelation, TemporalInput, TemporalRelation,
    TemporalResult,
};
use crate::store::AtomStore;

pub(crate) fn run(
    store: &AtomStore,
    params: &InferenceParams,
    input: &TemporalInput,
) -> InferResult<TemporalResult> {
    let started = Instant::now();
    let mut warnings = Vec::new();
    let mut violations = Vec::new();

    // First timed fact per atom wins.
    let mut intervals: HashMap<AtomId, (i64, i64)> = HashMap::new();
    let mut order: Vec<AtomId> = Vec::new();
    for fact in &input.facts {
        store.get(fact.atom)?;
        let span = i64::try_from(fact.duration).unwrap_or(i64::MAX);
        let end = fact.start.saturating_add(span);
        if intervals.contains_key(&fact.atom) {
            warnings.push(format!(
                "duplicate timed fact for atom {}; keeping the first",
                fact.atom
            ));
            continue;
        }
        intervals.insert(fact.atom, (fact.start, end));
        order.push(fact.atom);
    }

    // Pairwise relations, in fact order.
    let pair_budget = params.max_steps;
    let mut relations = Vec::new();
    let mut scanned = 0usize;
    let mut bound_reached = false;

    'pairs: for (i, &a) in order.iter().enumerate() {
        if let Some(budget) = params.timeout {
            if started.elapsed() >= budget {
                bound_reached = true;
                break;
            }
        }
        for &b in &order[i + 1..] {
            if scanned >= pair_budget || relations.len() >= params.max_results {
                bound_reached = true;
                break 'pairs;
            }
            scanned += 1;
            let relation = relation_of(intervals[&a], intervals[&b]);
            debug!(a = a.get(), b = b.get(), %relation, "computed interval relation");
            relations.push(TemporalRelation { a, b, relation });
        }
    }

    // Check assertions. Everything is normalized to a canonical pair
    // orientation (smaller id first) so `a before b` and `b after a` are
    // recognized as the same claim.
    let mut claims: HashMap<(AtomId, AtomId), IntervalRelation> = HashMap::new();
    for asserted in &input.asserted {
        let (a, b) = (asserted.a, asserted.b);
        let missing = [a, b]
            .into_iter()
            .filter(|id| !intervals.contains_key(id))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            for id in missing {
                warnings.push(format!("assertion references atom {id} with no timed fact"));
            }
            continue;
        }

        let (key, claimed) = if a.get() <= b.get() {
            ((a, b), asserted.relation)
        } else {
            ((b, a), asserted.relation.inverse())
        };
        match claims.get(&key) {
            Some(&previous) if previous != claimed => {
                violations.push(format!(
                    "contradictory assertions for atoms {} and {}: {} vs {}",
                    key.0, key.1, previous, claimed
                ));
                continue;
            }
            _ => {
                claims.insert(key, claimed);
            }
        }

        let computed = relation_of(intervals[&key.0], intervals[&key.1]);
        if computed != claimed {
            violations.push(format!(
                "asserted {} {} {} but timestamps say {}",
                key.0, claimed, key.1, computed
            ));
        }
    }

    let is_consistent = violations.is_empty();
    Ok(TemporalResult {
        relations,
        violations,
        warnings,
        is_consistent,
        bound_reached,
    })
}

/// The Allen relation of interval `a` with respect to interval `b`.
fn relation_of(a: (i64, i64), b: (i64, i64)) -> IntervalRelation {
    use IntervalRelation::*;
    let (s1, e1) = a;
    let (s2, e2) = b;
    if s1 == s2 && e1 == e2 {
        Equals
    } else if e1 < s2 {
        Before
    } else if e2 < s1 {
        After
    } else if e1 == s2 {
        Meets
    } else if e2 == s1 {
        MetBy
    } else if s1 == s2 {
        if e1 < e2 { Starts } else { StartedBy }
    } else if e1 == e2 {
        if s1 > s2 { Finishes } else { FinishedBy }
    } else if s1 > s2 && e1 < e2 {
        During
    } else if s1 < s2 && e1 > e2 {
        Contains
    } else if s1 < s2 {
        Overlaps
    } else {
        OverlappedBy
    }
}
