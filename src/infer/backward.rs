//! Backward chaining: recursive goal decomposition.
//!
//! A goal is proven either directly, by matching store atoms, or by
//! unifying it with a rule conclusion and proving the instantiated
//! premises. Confidence combines conjunctively: the minimum over premise
//! confidences, scaled by rule reliability. Recursion depth is bounded by
//! `max_steps`; the bound surfaces as `bound_reached` only when truncation
//! could have mattered, that is when the goal ended up unproven. Proven
//! goals whose losing rule branches bottomed out are still complete proofs.

use std::time::Instant;

use tracing::{debug, trace};

use crate::infer::{BackwardInput, BackwardResult, InferResult, InferenceParams, Subgoal};
use crate::pattern::matcher::{PatternMatcher, apply, reify, unify};
use crate::pattern::{Bindings, Pattern};
use crate::rules::RuleSet;
use crate::store::AtomStore;

pub(crate) fn run(
    store: &AtomStore,
    params: &InferenceParams,
    input: &BackwardInput,
) -> InferResult<BackwardResult> {
    let mut prover = Prover {
        store,
        matcher: PatternMatcher::new(store),
        rules: &input.rules,
        params,
        started: Instant::now(),
        subgoals: Vec::new(),
        proof_steps: Vec::new(),
        bound_reached: false,
        depth_truncated: false,
        fresh: 0,
    };

    let (root_proven, _, _) = prover.prove(&input.goal, 0);

    // Conjunctive overall confidence: the weakest proven subgoal limits
    // the whole proof.
    let overall_confidence = if root_proven {
        prover
            .subgoals
            .iter()
            .filter(|s| s.proven)
            .map(|s| s.confidence)
            .fold(f32::INFINITY, f32::min)
    } else {
        0.0
    };
    let overall_confidence = if overall_confidence.is_finite() {
        overall_confidence
    } else {
        0.0
    };
    let goal_proven = root_proven && overall_confidence >= params.confidence_threshold;
    // A depth-truncated branch only counts as a bound when the goal is not
    // proven: more search could not have un-proven an established proof.
    let bound_reached = prover.bound_reached || (prover.depth_truncated && !goal_proven);

    debug!(
        goal = %input.goal,
        goal_proven,
        overall_confidence,
        subgoals = prover.subgoals.len(),
        "backward chaining finished"
    );

    Ok(BackwardResult {
        subgoals: prover.subgoals,
        proof_steps: prover.proof_steps,
        goal_proven,
        overall_confidence,
        bound_reached,
    })
}

struct Prover<'a> {
    store: &'a AtomStore,
    matcher: PatternMatcher<'a>,
    rules: &'a RuleSet,
    params: &'a InferenceParams,
    started: Instant,
    subgoals: Vec<Subgoal>,
    proof_steps: Vec<String>,
    /// Hard bounds: timeout.
    bound_reached: bool,
    /// Some branch hit the depth limit; consequential only if unproven.
    depth_truncated: bool,
    fresh: usize,
}

impl Prover<'_> {
    /// Proves one subgoal, recording it in pre-order. Returns whether it is
    /// derivable, with what confidence, and the variable bindings of the
    /// winning direct match so callers can thread them through sibling
    /// premises (rule-derived proofs contribute no bindings).
    fn prove(&mut self, goal: &Pattern, depth: usize) -> (bool, f32, Bindings) {
        if depth >= self.params.max_steps {
            self.depth_truncated = true;
            self.record(goal, false, 0.0, depth);
            return (false, 0.0, Bindings::new());
        }
        if let Some(budget) = self.params.timeout {
            if self.started.elapsed() >= budget {
                self.bound_reached = true;
                self.record(goal, false, 0.0, depth);
                return (false, 0.0, Bindings::new());
            }
        }

        // Reserve the slot so parents precede children in the trace.
        let slot = self.subgoals.len();
        self.record(goal, false, 0.0, depth);

        let mut best: Option<(f32, Bindings)> = None;

        // Direct proof against the store.
        for (id, bindings) in self.matcher.matches_entries(goal, self.params.max_results) {
            if let Ok(atom) = self.store.get(id) {
                let conf = atom.truth.confidence;
                if best.as_ref().is_none_or(|(b, _)| conf > *b) {
                    best = Some((conf, bindings));
                }
            }
        }
        if let Some((conf, _)) = &best {
            self.proof_steps
                .push(format!("{goal} matched directly (confidence {conf:.2})"));
        }

        // Rule proofs: unify the goal with each conclusion and prove the
        // instantiated premises left to right, folding each premise's
        // bindings into the substitution for the next.
        for rule in self.rules.iter().cloned().collect::<Vec<_>>() {
            self.fresh += 1;
            let suffix = self.fresh;
            let freshen = |name: &str| format!("{name}#{suffix}");
            let conclusion = rule.conclusion.rename_vars(&freshen);
            let Some(mut subst) = unify(goal, &conclusion) else {
                continue;
            };
            trace!(rule = %rule.name, %goal, "goal unifies with rule conclusion");

            let mut conf = f32::INFINITY;
            let mut all_proven = true;
            for premise in &rule.premises {
                let instantiated = apply(&subst, &premise.rename_vars(&freshen));
                let (proven, premise_conf, bindings) = self.prove(&instantiated, depth + 1);
                if !proven {
                    all_proven = false;
                    break;
                }
                conf = conf.min(premise_conf);
                for (var, id) in bindings {
                    if let Some(ground) = reify(self.store, id) {
                        subst.entry(var).or_insert(ground);
                    }
                }
            }
            if all_proven && conf.is_finite() {
                let conf = conf * rule.reliability;
                self.proof_steps
                    .push(format!("{goal} derived via rule {}", rule.name));
                if best.as_ref().is_none_or(|(b, _)| conf > *b) {
                    best = Some((conf, Bindings::new()));
                }
            }
        }

        let (proven, confidence, bindings) = match best {
            Some((conf, bindings)) => (true, conf, bindings),
            None => (false, 0.0, Bindings::new()),
        };
        self.subgoals[slot].proven = proven;
        self.subgoals[slot].confidence = confidence;
        (proven, confidence, bindings)
    }

    fn record(&mut self, goal: &Pattern, proven: bool, confidence: f32, depth: usize) {
        self.subgoals.push(Subgoal {
            goal: goal.to_string(),
            proven,
            confidence,
            depth,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{LinkKind, NodeKind};
    use crate::rules::Rule;
    use crate::truth::TruthValue;

    fn fact(store: &AtomStore, a: &str, b: &str, confidence: f32) {
        let a = store
            .add_node(NodeKind::Concept, a, TruthValue::CERTAIN)
            .unwrap();
        let b = store
            .add_node(NodeKind::Concept, b, TruthValue::CERTAIN)
            .unwrap();
        store
            .add_link(
                LinkKind::Inheritance,
                vec![a, b],
                TruthValue::new(1.0, confidence).unwrap(),
            )
            .unwrap();
    }

    fn goal(text: &str) -> Pattern {
        text.parse().unwrap()
    }

    #[test]
    fn direct_match_proves_a_ground_goal() {
        let store = AtomStore::new();
        fact(&store, "socrates", "human", 0.9);

        let result = run(
            &store,
            &InferenceParams::default(),
            &BackwardInput {
                goal: goal("(Inheritance (Concept \"socrates\") (Concept \"human\"))"),
                rules: RuleSet::builtin(),
            },
        )
        .unwrap();
        assert!(result.goal_proven);
        assert!((result.overall_confidence - 0.9).abs() < 1e-6);
        assert!(!result.bound_reached);
    }

    #[test]
    fn transitive_goal_is_derived_through_a_rule() {
        let store = AtomStore::new();
        // socrates -> human reuses the "human" concept added second.
        let s = store
            .add_node(NodeKind::Concept, "socrates", TruthValue::CERTAIN)
            .unwrap();
        let h = store
            .add_node(NodeKind::Concept, "human", TruthValue::CERTAIN)
            .unwrap();
        let a = store
            .add_node(NodeKind::Concept, "animal", TruthValue::CERTAIN)
            .unwrap();
        let strong = TruthValue::new(1.0, 0.9).unwrap();
        store
            .add_link(LinkKind::Inheritance, vec![s, h], strong)
            .unwrap();
        store
            .add_link(LinkKind::Inheritance, vec![h, a], strong)
            .unwrap();

        let result = run(
            &store,
            &InferenceParams::default(),
            &BackwardInput {
                goal: goal("(Inheritance (Concept \"socrates\") (Concept \"animal\"))"),
                rules: RuleSet::builtin(),
            },
        )
        .unwrap();
        assert!(result.goal_proven);
        assert!(
            result
                .proof_steps
                .iter()
                .any(|s| s.contains("inheritance-transitive"))
        );
        // min(0.9, 0.9) * 0.95
        assert!((result.overall_confidence - 0.855).abs() < 1e-4);
        // Losing recursive branches bottomed out, but the proof is complete.
        assert!(!result.bound_reached);
    }

    #[test]
    fn weakest_subgoal_limits_overall_confidence() {
        let store = AtomStore::new();
        fact(&store, "a", "p", 0.9);
        fact(&store, "b", "q", 0.6);
        fact(&store, "c", "r", 0.8);

        let rule = Rule::new(
            "three-legs",
            vec![
                goal("(Inheritance (Concept \"a\") (Concept \"p\"))"),
                goal("(Inheritance (Concept \"b\") (Concept \"q\"))"),
                goal("(Inheritance (Concept \"c\") (Concept \"r\"))"),
            ],
            goal("(Inheritance (Concept \"a\") (Concept \"r\"))"),
        );
        let rules = RuleSet::new("test").with_rule(rule);

        let result = run(
            &store,
            &InferenceParams::default(),
            &BackwardInput {
                goal: goal("(Inheritance (Concept \"a\") (Concept \"r\"))"),
                rules,
            },
        )
        .unwrap();
        // Derivable, but min(0.9, 0.6, 0.8) = 0.6 is under the 0.7 threshold.
        assert!((result.overall_confidence - 0.6).abs() < 1e-6);
        assert!(!result.goal_proven);
        let proven = result.subgoals.iter().filter(|s| s.proven).count();
        assert_eq!(proven, 4); // root plus three premises
    }

    #[test]
    fn unprovable_goal_reports_zero_confidence() {
        let store = AtomStore::new();
        let result = run(
            &store,
            &InferenceParams::default(),
            &BackwardInput {
                goal: goal("(Inheritance (Concept \"x\") (Concept \"y\"))"),
                rules: RuleSet::new("empty"),
            },
        )
        .unwrap();
        assert!(!result.goal_proven);
        assert_eq!(result.overall_confidence, 0.0);
    }

    #[test]
    fn depth_bound_flags_bound_reached() {
        let store = AtomStore::new();
        fact(&store, "a", "b", 0.9);
        // similarity-symmetric can recurse on itself forever without facts.
        let result = run(
            &store,
            &InferenceParams::default().with_max_steps(2),
            &BackwardInput {
                goal: goal("(Similarity (Concept \"x\") (Concept \"y\"))"),
                rules: RuleSet::builtin(),
            },
        )
        .unwrap();
        assert!(!result.goal_proven);
        assert!(result.bound_reached);
    }

    #[test]
    fn variable_goal_binds_against_the_store() {
        let store = AtomStore::new();
        fact(&store, "socrates", "human", 0.95);
        let result = run(
            &store,
            &InferenceParams::default(),
            &BackwardInput {
                goal: goal("(Inheritance $x (Concept \"human\"))"),
                rules: RuleSet::new("empty"),
            },
        )
        .unwrap();
        assert!(result.goal_proven);
        assert!((result.overall_confidence - 0.95).abs() < 1e-6);
    }
}
