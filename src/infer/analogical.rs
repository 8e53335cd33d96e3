//! Analogical inference: map a source domain onto a target domain.
//!
//! Every source/target atom pair gets a structural similarity score; a
//! greedy one-to-one mapping keeps the strongest pairs above the floor
//! (the shared `confidence_threshold`). Source-domain relations whose
//! endpoints are all mapped are then projected onto the target domain as
//! predictions, skipping relations the store already holds.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::atom::{Atom, AtomId};
use crate::infer::{
    AnalogicalInput, AnalogyMapping, AnalogyResult, InferResult, InferenceParams, Prediction,
};
use crate::store::AtomStore;

pub(crate) fn run(
    store: &AtomStore,
    params: &InferenceParams,
    input: &AnalogicalInput,
) -> InferResult<AnalogyResult> {
    // Score every cross-domain pair, up to the scan budget.
    let pair_budget = params.max_steps;
    let mut pairs: Vec<AnalogyMapping> = Vec::new();
    let mut scanned = 0usize;
    let mut bound_reached = false;

    'scan: for &source in &input.source {
        for &target in &input.target {
            if scanned >= pair_budget {
                bound_reached = true;
                break 'scan;
            }
            scanned += 1;
            let similarity = atom_similarity(store, source, target);
            if similarity > 0.0 {
                pairs.push(AnalogyMapping {
                    source,
                    target,
                    similarity,
                });
            }
        }
    }

    // Greedy one-to-one assignment, strongest pairs first. Ties break on
    // atom ids so the mapping is deterministic.
    pairs.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.source.get().cmp(&b.source.get()))
            .then(a.target.get().cmp(&b.target.get()))
    });
    let mut used_source = HashSet::new();
    let mut used_target = HashSet::new();
    let mut analogies = Vec::new();
    for pair in pairs {
        if pair.similarity < params.confidence_threshold {
            break; // sorted: everything after is weaker
        }
        if analogies.len() >= params.max_results {
            bound_reached = true;
            break;
        }
        if used_source.contains(&pair.source) || used_target.contains(&pair.target) {
            continue;
        }
        used_source.insert(pair.source);
        used_target.insert(pair.target);
        debug!(
            source = pair.source.get(),
            target = pair.target.get(),
            similarity = pair.similarity,
            "mapped analogy pair"
        );
        analogies.push(pair);
    }

    let structural_similarity = if analogies.is_empty() {
        0.0
    } else {
        analogies.iter().map(|m| m.similarity).sum::<f32>() / analogies.len() as f32
    };

    let mapping: BTreeMap<AtomId, (AtomId, f32)> = analogies
        .iter()
        .map(|m| (m.source, (m.target, m.similarity)))
        .collect();
    let predictions = project(store, &input.source, &mapping, params.max_results);

    Ok(AnalogyResult {
        analogies,
        structural_similarity,
        predictions,
        bound_reached,
    })
}

/// Structural similarity of two atoms, in `[0, 1]`.
///
/// Nodes of the same kind score 0.6, plus 0.4 for an identical name.
/// Links of the same kind score 0.5, plus 0.3 for equal arity, plus up to
/// 0.2 for aligned slots whose targets are themselves structurally alike.
/// Anything else scores 0.
fn atom_similarity(store: &AtomStore, a: AtomId, b: AtomId) -> f32 {
    let (Ok(a), Ok(b)) = (store.get(a), store.get(b)) else {
        return 0.0;
    };
    if !a.is_link() && !b.is_link() {
        if a.node_kind() != b.node_kind() {
            return 0.0;
        }
        let mut score = 0.6;
        if a.name() == b.name() {
            score += 0.4;
        }
        return score;
    }
    if let (Some(out_a), Some(out_b)) = (a.outgoing(), b.outgoing()) {
        if a.link_kind() != b.link_kind() {
            return 0.0;
        }
        let mut score = 0.5;
        if out_a.len() == out_b.len() {
            score += 0.3;
            let aligned = out_a
                .iter()
                .zip(out_b)
                .filter(|&(&x, &y)| slot_kind_matches(store, x, y))
                .count();
            score += 0.2 * aligned as f32 / out_a.len().max(1) as f32;
        }
        return score;
    }
    0.0
}

/// Whether two slot targets are the same category and kind.
fn slot_kind_matches(store: &AtomStore, a: AtomId, b: AtomId) -> bool {
    let (Ok(a), Ok(b)) = (store.get(a), store.get(b)) else {
        return false;
    };
    a.node_kind() == b.node_kind() && a.link_kind() == b.link_kind()
}

/// Project source-domain links onto the target domain through the mapping.
fn project(
    store: &AtomStore,
    source: &[AtomId],
    mapping: &BTreeMap<AtomId, (AtomId, f32)>,
    max_results: usize,
) -> Vec<Prediction> {
    let existing: Vec<Atom> = store.atoms();
    let mut predictions = Vec::new();

    for &id in source {
        if predictions.len() >= max_results {
            break;
        }
        let Ok(atom) = store.get(id) else { continue };
        let (Some(kind), Some(outgoing)) = (atom.link_kind(), atom.outgoing()) else {
            continue;
        };
        // Every endpoint must have a counterpart in the target domain.
        let Some(projected) = outgoing
            .iter()
            .map(|out| mapping.get(out).copied())
            .collect::<Option<Vec<(AtomId, f32)>>>()
        else {
            continue;
        };
        let target_outgoing: Vec<AtomId> = projected.iter().map(|(t, _)| *t).collect();
        if target_outgoing == outgoing {
            continue; // link maps onto itself
        }
        // Skip relations the store already knows.
        let known = existing.iter().any(|a| {
            a.link_kind() == Some(kind) && a.outgoing() == Some(target_outgoing.as_slice())
        });
        if known {
            continue;
        }
        let confidence = atom.truth.confidence
            * (projected.iter().map(|(_, s)| *s).sum::<f32>() / projected.len().max(1) as f32);
        debug!(kind = %kind, confidence, "projected relation onto target domain");
        predictions.push(Prediction {
            kind,
            outgoing: target_outgoing,
            confidence,
        });
    }
    predictions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{LinkKind, NodeKind};
    use crate::truth::TruthValue;

    /// Solar system vs. atom: sun/planet orbits map onto nucleus/electron.
    fn two_domains() -> (AtomStore, Vec<AtomId>, Vec<AtomId>) {
        let store = AtomStore::new();
        let sun = store
            .add_node(NodeKind::Concept, "sun", TruthValue::CERTAIN)
            .unwrap();
        let planet = store
            .add_node(NodeKind::Concept, "planet", TruthValue::CERTAIN)
            .unwrap();
        let orbit = store
            .add_link(
                LinkKind::Similarity,
                vec![planet, sun],
                TruthValue::new(1.0, 0.9).unwrap(),
            )
            .unwrap();
        let nucleus = store
            .add_node(NodeKind::Concept, "nucleus", TruthValue::CERTAIN)
            .unwrap();
        let electron = store
            .add_node(NodeKind::Concept, "electron", TruthValue::CERTAIN)
            .unwrap();
        (
            store,
            vec![sun, planet, orbit],
            vec![nucleus, electron],
        )
    }

    #[test]
    fn concepts_map_one_to_one() {
        let (store, source, target) = two_domains();
        let params = InferenceParams::default().with_threshold(0.5);
        let result = run(&store, &params, &AnalogicalInput { source, target }).unwrap();

        // Two concept-to-concept mappings; the link has no counterpart.
        assert_eq!(result.analogies.len(), 2);
        assert!(result.analogies.iter().all(|m| m.similarity >= 0.5));
        let sources: HashSet<_> = result.analogies.iter().map(|m| m.source).collect();
        let targets: HashSet<_> = result.analogies.iter().map(|m| m.target).collect();
        assert_eq!(sources.len(), 2);
        assert_eq!(targets.len(), 2);
        assert!((result.structural_similarity - 0.6).abs() < 1e-6);
    }

    #[test]
    fn source_relation_is_projected_onto_the_target() {
        let (store, source, target) = two_domains();
        let params = InferenceParams::default().with_threshold(0.5);
        let result = run(&store, &params, &AnalogicalInput { source, target }).unwrap();

        // planet-orbits-sun projects to a target-domain Similarity link.
        assert_eq!(result.predictions.len(), 1);
        let prediction = &result.predictions[0];
        assert_eq!(prediction.kind, LinkKind::Similarity);
        assert_eq!(prediction.outgoing.len(), 2);
        assert!(prediction.confidence > 0.0);
        // Endpoints come from the target domain.
        for id in &prediction.outgoing {
            let name = store.get(*id).unwrap().name().unwrap().to_string();
            assert!(name == "nucleus" || name == "electron");
        }
    }

    #[test]
    fn floor_excludes_weak_pairs() {
        let (store, source, target) = two_domains();
        // Nothing shares a name, so 0.6 pairs die under a 0.95 floor.
        let params = InferenceParams::default().with_threshold(0.95);
        let result = run(&store, &params, &AnalogicalInput { source, target }).unwrap();
        assert!(result.analogies.is_empty());
        assert_eq!(result.structural_similarity, 0.0);
        assert!(result.predictions.is_empty());
    }

    #[test]
    fn identical_names_score_full_similarity() {
        let store = AtomStore::new();
        let a = store
            .add_node(NodeKind::Concept, "water", TruthValue::CERTAIN)
            .unwrap();
        let b = store
            .add_node(NodeKind::Concept, "water", TruthValue::CERTAIN)
            .unwrap();
        assert!((atom_similarity(&store, a, b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mixed_categories_do_not_match() {
        let store = AtomStore::new();
        let a = store
            .add_node(NodeKind::Concept, "x", TruthValue::CERTAIN)
            .unwrap();
        let b = store
            .add_node(NodeKind::Concept, "y", TruthValue::CERTAIN)
            .unwrap();
        let link = store
            .add_link(LinkKind::Similarity, vec![a, b], TruthValue::CERTAIN)
            .unwrap();
        assert_eq!(atom_similarity(&store, a, link), 0.0);
    }

    #[test]
    fn pair_budget_flags_bound() {
        let store = AtomStore::new();
        let mut ids = Vec::new();
        for i in 0..6 {
            ids.push(
                store
                    .add_node(NodeKind::Concept, format!("n{i}"), TruthValue::CERTAIN)
                    .unwrap(),
            );
        }
        // 3 x 3 = 9 pairs against a scan budget of 1.
        let params = InferenceParams::default()
            .with_max_steps(1)
            .with_max_results(2);
        let result = run(
            &store,
            &params,
            &AnalogicalInput {
                source: ids[..3].to_vec(),
                target: ids[3..].to_vec(),
            },
        )
        .unwrap();
        assert!(result.bound_reached);
    }
}
