//! Multi-strategy inference over the atom store.
//!
//! Six reasoning strategies share one parameter contract
//! ([`InferenceParams`]) and one result envelope ([`StrategyResult`]):
//! forward chaining, backward chaining, abductive, analogical,
//! probabilistic, and temporal. Every strategy is a pure function of the
//! store snapshot and its inputs — none mutates the store, and every one is
//! guaranteed to terminate by its step/result bounds. Reaching a bound is
//! not an error; it is reported through the `bound_reached` flag so callers
//! can distinguish "no answer" from "search exhausted".

pub mod abductive;
pub mod analogical;
pub mod backward;
pub mod engine;
pub mod forward;
pub mod probabilistic;
pub mod temporal;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::atom::{AtomId, LinkKind};
use crate::error::InferError;
use crate::pattern::Pattern;
use crate::rules::{Hypothesis, RuleSet};

/// Result type for inference operations.
pub type InferResult<T> = std::result::Result<T, InferError>;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// The closed set of reasoning strategies.
///
/// Dispatch goes through a fixed `match` in [`engine::InferenceEngine`];
/// adding a strategy is a new variant plus handler, never a string branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    ForwardChaining,
    BackwardChaining,
    Abductive,
    Analogical,
    Probabilistic,
    Temporal,
}

impl Strategy {
    /// All strategies, in the order they are documented.
    pub const ALL: [Strategy; 6] = [
        Strategy::ForwardChaining,
        Strategy::BackwardChaining,
        Strategy::Abductive,
        Strategy::Analogical,
        Strategy::Probabilistic,
        Strategy::Temporal,
    ];
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::ForwardChaining => "forward",
            Strategy::BackwardChaining => "backward",
            Strategy::Abductive => "abductive",
            Strategy::Analogical => "analogical",
            Strategy::Probabilistic => "probabilistic",
            Strategy::Temporal => "temporal",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for Strategy {
    type Err = InferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" | "forwardChaining" | "forward-chaining" => Ok(Strategy::ForwardChaining),
            "backward" | "backwardChaining" | "backward-chaining" => {
                Ok(Strategy::BackwardChaining)
            }
            "abductive" => Ok(Strategy::Abductive),
            "analogical" => Ok(Strategy::Analogical),
            "probabilistic" => Ok(Strategy::Probabilistic),
            "temporal" => Ok(Strategy::Temporal),
            other => Err(InferError::UnknownStrategy {
                name: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared parameters
// ---------------------------------------------------------------------------

/// Parameter contract shared by all six strategies.
#[derive(Debug, Clone)]
pub struct InferenceParams {
    /// Execution bound: iterations, recursion depth, pairs scanned, or
    /// propagation rounds, depending on the strategy.
    pub max_steps: usize,
    /// Acceptance bound in `[0, 1]`. Doubles as the similarity floor for
    /// the analogical strategy.
    pub confidence_threshold: f32,
    /// Output bound.
    pub max_results: usize,
    /// Optional wall-clock budget, checked at iteration boundaries of the
    /// forward, backward, and temporal loops. Expiry surfaces as
    /// `bound_reached`, never as an error.
    pub timeout: Option<Duration>,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            max_steps: 10,
            confidence_threshold: 0.7,
            max_results: 10,
            timeout: None,
        }
    }
}

impl InferenceParams {
    /// Builder: set `max_steps`.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Builder: set `confidence_threshold`.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Builder: set `max_results`.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Builder: set the wall-clock timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ---------------------------------------------------------------------------
// Strategy inputs
// ---------------------------------------------------------------------------

/// Input to forward chaining: premise atoms plus the rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardInput {
    pub premises: Vec<AtomId>,
    pub rules: RuleSet,
}

/// Input to backward chaining: a goal pattern plus the rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackwardInput {
    pub goal: Pattern,
    pub rules: RuleSet,
}

/// Input to abduction: an observation plus candidate hypotheses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbductiveInput {
    pub observation: Pattern,
    pub hypotheses: Vec<Hypothesis>,
}

/// Input to analogy: source and target domain atom sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalogicalInput {
    pub source: Vec<AtomId>,
    pub target: Vec<AtomId>,
}

/// A fact in a probabilistic dependency graph. Roots carry priors;
/// derived facts get their probability from propagation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProbFact {
    pub atom: AtomId,
    pub prior: Option<f32>,
}

/// A conditional dependency: `P(conclusion | premise) = conditional`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Dependency {
    pub premise: AtomId,
    pub conclusion: AtomId,
    pub conditional: f32,
}

/// Input to probabilistic propagation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilisticInput {
    pub facts: Vec<ProbFact>,
    pub dependencies: Vec<Dependency>,
}

/// A fact tagged with an interval: `[start, start + duration]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimedFact {
    pub atom: AtomId,
    pub start: i64,
    pub duration: u64,
}

/// An interval relation asserted by the caller, checked against the
/// timestamp-computed relations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssertedRelation {
    pub a: AtomId,
    pub b: AtomId,
    pub relation: IntervalRelation,
}

/// Input to temporal analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalInput {
    pub facts: Vec<TimedFact>,
    pub asserted: Vec<AssertedRelation>,
}

/// Strategy-tagged input; the variant selects the procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StrategyInput {
    Forward(ForwardInput),
    Backward(BackwardInput),
    Abductive(AbductiveInput),
    Analogical(AnalogicalInput),
    Probabilistic(ProbabilisticInput),
    Temporal(TemporalInput),
}

impl StrategyInput {
    /// Which strategy this input drives.
    pub fn strategy(&self) -> Strategy {
        match self {
            StrategyInput::Forward(_) => Strategy::ForwardChaining,
            StrategyInput::Backward(_) => Strategy::BackwardChaining,
            StrategyInput::Abductive(_) => Strategy::Abductive,
            StrategyInput::Analogical(_) => Strategy::Analogical,
            StrategyInput::Probabilistic(_) => Strategy::Probabilistic,
            StrategyInput::Temporal(_) => Strategy::Temporal,
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy results
// ---------------------------------------------------------------------------

/// A ground conclusion derived by forward chaining. Assertable back into
/// the store by the caller — the engine never writes its own conclusions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conclusion {
    pub kind: LinkKind,
    pub outgoing: Vec<AtomId>,
    pub confidence: f32,
    /// Name of the rule that fired.
    pub rule: String,
    /// Iteration (1-based) in which this conclusion was derived.
    pub step: usize,
}

/// Result of forward chaining: conclusions in derivation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardResult {
    pub steps: usize,
    pub conclusions: Vec<Conclusion>,
    pub bound_reached: bool,
}

/// One subgoal visited by backward chaining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subgoal {
    /// Textual form of the subgoal pattern.
    pub goal: String,
    pub proven: bool,
    pub confidence: f32,
    pub depth: usize,
}

/// Result of backward chaining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackwardResult {
    pub subgoals: Vec<Subgoal>,
    pub proof_steps: Vec<String>,
    pub goal_proven: bool,
    /// Minimum confidence across proven subgoals (conjunctive semantics).
    pub overall_confidence: f32,
    pub bound_reached: bool,
}

/// A hypothesis scored by abduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredHypothesis {
    pub name: String,
    /// Prior confidence × consistency with existing facts.
    pub plausibility: f32,
    pub prior: f32,
    pub consistency: f32,
}

/// Result of abduction: hypotheses in descending plausibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbductiveResult {
    pub hypotheses: Vec<ScoredHypothesis>,
    /// Name of the top-ranked hypothesis, if any scored.
    pub best_explanation: Option<String>,
    pub bound_reached: bool,
}

/// One source-to-target element mapping found by analogy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalogyMapping {
    pub source: AtomId,
    pub target: AtomId,
    pub similarity: f32,
}

/// A relation projected from the source domain onto mapped target elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub kind: LinkKind,
    pub outgoing: Vec<AtomId>,
    /// Similarity-weighted confidence of the projection.
    pub confidence: f32,
}

/// Result of analogical inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalogyResult {
    /// Mappings above the similarity floor, in descending similarity.
    pub analogies: Vec<AnalogyMapping>,
    /// Mean similarity of retained mappings (0 when none).
    pub structural_similarity: f32,
    pub predictions: Vec<Prediction>,
    pub bound_reached: bool,
}

/// A derived fact probability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Inference {
    pub atom: AtomId,
    pub probability: f32,
    /// `1 − probability`.
    pub uncertainty: f32,
}

/// Result of probabilistic propagation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilisticResult {
    pub inferences: Vec<Inference>,
    pub rounds: usize,
    pub bound_reached: bool,
}

/// The thirteen Allen interval relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalRelation {
    Before,
    After,
    Meets,
    MetBy,
    Overlaps,
    OverlappedBy,
    During,
    Contains,
    Starts,
    StartedBy,
    Finishes,
    FinishedBy,
    Equals,
}

impl IntervalRelation {
    /// The relation seen from the other interval's perspective.
    pub fn inverse(self) -> IntervalRelation {
        use IntervalRelation::*;
        match self {
            Before => After,
            After => Before,
            Meets => MetBy,
            MetBy => Meets,
            Overlaps => OverlappedBy,
            OverlappedBy => Overlaps,
            During => Contains,
            Contains => During,
            Starts => StartedBy,
            StartedBy => Starts,
            Finishes => FinishedBy,
            FinishedBy => Finishes,
            Equals => Equals,
        }
    }
}

impl std::fmt::Display for IntervalRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use IntervalRelation::*;
        let name = match self {
            Before => "before",
            After => "after",
            Meets => "meets",
            MetBy => "met-by",
            Overlaps => "overlaps",
            OverlappedBy => "overlapped-by",
            During => "during",
            Contains => "contains",
            Starts => "starts",
            StartedBy => "started-by",
            Finishes => "finishes",
            FinishedBy => "finished-by",
            Equals => "equals",
        };
        write!(f, "{name}")
    }
}

/// One computed pairwise relation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TemporalRelation {
    pub a: AtomId,
    pub b: AtomId,
    pub relation: IntervalRelation,
}

/// Result of temporal analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalResult {
    pub relations: Vec<TemporalRelation>,
    /// Contradictions: mutually exclusive assertions for one pair, or an
    /// assertion disagreeing with the computed relation.
    pub violations: Vec<String>,
    /// Non-fatal issues, e.g. assertions over atoms with no timed fact.
    pub warnings: Vec<String>,
    pub is_consistent: bool,
    pub bound_reached: bool,
}

/// Strategy-tagged result envelope; the wire contract collaborators consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StrategyResult {
    Forward(ForwardResult),
    Backward(BackwardResult),
    Abductive(AbductiveResult),
    Analogical(AnalogyResult),
    Probabilistic(ProbabilisticResult),
    Temporal(TemporalResult),
}

impl StrategyResult {
    /// Which strategy produced this result.
    pub fn strategy(&self) -> Strategy {
        match self {
            StrategyResult::Forward(_) => Strategy::ForwardChaining,
            StrategyResult::Backward(_) => Strategy::BackwardChaining,
            StrategyResult::Abductive(_) => Strategy::Abductive,
            StrategyResult::Analogical(_) => Strategy::Analogical,
            StrategyResult::Probabilistic(_) => Strategy::Probabilistic,
            StrategyResult::Temporal(_) => Strategy::Temporal,
        }
    }

    /// Whether the strategy stopped on a bound rather than exhausting its search.
    pub fn bound_reached(&self) -> bool {
        match self {
            StrategyResult::Forward(r) => r.bound_reached,
            StrategyResult::Backward(r) => r.bound_reached,
            StrategyResult::Abductive(r) => r.bound_reached,
            StrategyResult::Analogical(r) => r.bound_reached,
            StrategyResult::Probabilistic(r) => r.bound_reached,
            StrategyResult::Temporal(r) => r.bound_reached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_match_contract() {
        let p = InferenceParams::default();
        assert_eq!(p.max_steps, 10);
        assert!((p.confidence_threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(p.max_results, 10);
        assert!(p.timeout.is_none());
    }

    #[test]
    fn strategy_from_str() {
        assert_eq!(
            "forward".parse::<Strategy>().unwrap(),
            Strategy::ForwardChaining
        );
        assert_eq!(
            "backwardChaining".parse::<Strategy>().unwrap(),
            Strategy::BackwardChaining
        );
        assert_eq!("temporal".parse::<Strategy>().unwrap(), Strategy::Temporal);
        assert!(matches!(
            "psychic".parse::<Strategy>(),
            Err(InferError::UnknownStrategy { .. })
        ));
    }

    #[test]
    fn strategy_display_parses_back() {
        for s in Strategy::ALL {
            assert_eq!(s.to_string().parse::<Strategy>().unwrap(), s);
        }
    }

    #[test]
    fn interval_inverse_is_involutive() {
        use IntervalRelation::*;
        for r in [
            Before, After, Meets, MetBy, Overlaps, OverlappedBy, During, Contains, Starts,
            StartedBy, Finishes, FinishedBy, Equals,
        ] {
            assert_eq!(r.inverse().inverse(), r);
        }
    }

    #[test]
    fn input_strategy_tags() {
        let input = StrategyInput::Analogical(AnalogicalInput {
            source: vec![],
            target: vec![],
        });
        assert_eq!(input.strategy(), Strategy::Analogical);
    }
}
