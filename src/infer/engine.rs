//! Strategy dispatch.

use tracing::info;

use crate::infer::{InferResult, InferenceParams, Strategy, StrategyInput, StrategyResult};
use crate::infer::{abductive, analogical, backward, forward, probabilistic, temporal};
use crate::store::AtomStore;

/// Runs inference strategies against a store snapshot.
///
/// Strategies read the store; they never write it. Conclusions come back in
/// the [`StrategyResult`] for the caller to assert (or discard).
pub struct InferenceEngine<'a> {
    store: &'a AtomStore,
}

impl<'a> InferenceEngine<'a> {
    pub fn new(store: &'a AtomStore) -> Self {
        Self { store }
    }

    /// Dispatch on the input variant. The `match` is exhaustive: a new
    /// strategy will not compile until it is handled here.
    pub fn infer(
        &self,
        params: &InferenceParams,
        input: &StrategyInput,
    ) -> InferResult<StrategyResult> {
        let strategy = input.strategy();
        info!(%strategy, max_steps = params.max_steps, "running inference");

        let result = match input {
            StrategyInput::Forward(input) => {
                StrategyResult::Forward(forward::run(self.store, params, input)?)
            }
            StrategyInput::Backward(input) => {
                StrategyResult::Backward(backward::run(self.store, params, input)?)
            }
            StrategyInput::Abductive(input) => {
                StrategyResult::Abductive(abductive::run(self.store, params, input)?)
            }
            StrategyInput::Analogical(input) => {
                StrategyResult::Analogical(analogical::run(self.store, params, input)?)
            }
            StrategyInput::Probabilistic(input) => {
                StrategyResult::Probabilistic(probabilistic::run(self.store, params, input)?)
            }
            StrategyInput::Temporal(input) => {
                StrategyResult::Temporal(temporal::run(self.store, params, input)?)
            }
        };

        if result.bound_reached() {
            info!(%strategy, "inference stopped on a bound");
        }
        Ok(result)
    }

    /// Parse a strategy name, surfacing unknown names as
    /// [`InferError::UnknownStrategy`](crate::error::InferError::UnknownStrategy).
    pub fn parse_strategy(name: &str) -> InferResult<Strategy> {
        name.parse()
    }
}
