//! Abduction: rank candidate hypotheses as explanations of an observation.
//!
//! A hypothesis is a candidate only when its consequence unifies with the
//! observation. Plausibility is the hypothesis prior scaled by consistency:
//! the mean truth confidence of store atoms matching the unified
//! consequence, or zero when the store holds no support.

use tracing::debug;

use crate::infer::{
    AbductiveInput, AbductiveResult, InferResult, InferenceParams, ScoredHypothesis,
};
use crate::pattern::matcher::{PatternMatcher, apply, unify};
use crate::store::AtomStore;

pub(crate) fn run(
    store: &AtomStore,
    params: &InferenceParams,
    input: &AbductiveInput,
) -> InferResult<AbductiveResult> {
    let matcher = PatternMatcher::new(store);
    let mut scored = Vec::new();
    let mut bound_reached = false;

    for hypothesis in &input.hypotheses {
        if scored.len() >= params.max_results {
            bound_reached = true;
            break;
        }
        // The consequence must be able to produce the observation at all.
        let Some(subst) = unify(&input.observation, &hypothesis.consequence) else {
            debug!(
                hypothesis = %hypothesis.name,
                "consequence does not unify with the observation"
            );
            continue;
        };
        let grounded = apply(&subst, &hypothesis.consequence);

        let support = matcher.matches_entries(&grounded, params.max_results);
        let consistency = if support.is_empty() {
            0.0
        } else {
            let total: f32 = support
                .iter()
                .filter_map(|(id, _)| store.get(*id).ok())
                .map(|atom| atom.truth.confidence)
                .sum();
            total / support.len() as f32
        };

        let prior = hypothesis.prior.confidence;
        let plausibility = prior * consistency;
        debug!(
            hypothesis = %hypothesis.name,
            prior,
            consistency,
            plausibility,
            "scored hypothesis"
        );
        scored.push(ScoredHypothesis {
            name: hypothesis.name.clone(),
            plausibility,
            prior,
            consistency,
        });
    }

    // Stable sort: equal plausibility preserves input order.
    scored.sort_by(|a, b| {
        b.plausibility
            .partial_cmp(&a.plausibility)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let best_explanation = scored.first().map(|h| h.name.clone());

    Ok(AbductiveResult {
        hypotheses: scored,
        best_explanation,
        bound_reached,
    })
}
