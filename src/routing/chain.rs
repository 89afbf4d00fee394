use crate::config::RoutingConfig;

use super::candidate::Candidate;
use super::context::RoutingContext;
use super::decision::{RouteDecision, RoutingError};
use super::strategies::{
    CapabilityFilterStrategy, ContextWindowStrategy, CostOptimizationStrategy,
    HealthFilterStrategy, LoadBalancingStrategy, UserPreferenceStrategy,
};
use super::strategy::Strategy;

/// Ordered pipeline of strategies producing a single winner.
///
/// Strategies are held sorted by descending priority; strategies sharing a
/// priority keep the order they were added in.
#[derive(Default)]
pub struct StrategyChain {
    strategies: Vec<Box<dyn Strategy>>,
}

impl std::fmt::Debug for StrategyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| (s.name(), s.priority())))
            .finish()
    }
}

impl StrategyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// All six built-in strategies, tuned by `config`.
    pub fn default_chain(config: &RoutingConfig) -> Self {
        Self::with_load_balancer(config, LoadBalancingStrategy::new(config.jitter_epsilon))
    }

    /// Like [`StrategyChain::default_chain`] but with a deterministic jitter source.
    pub fn seeded(config: &RoutingConfig, seed: u64) -> Self {
        Self::with_load_balancer(
            config,
            LoadBalancingStrategy::with_seed(config.jitter_epsilon, seed),
        )
    }

    fn with_load_balancer(config: &RoutingConfig, balancer: LoadBalancingStrategy) -> Self {
        let mut chain = Self::new();
        chain.add(UserPreferenceStrategy::new(config.preference_bonus_step));
        chain.add(HealthFilterStrategy);
        chain.add(CapabilityFilterStrategy);
        chain.add(ContextWindowStrategy::new(
            config.output_token_buffer,
            config.context_window_weight,
        ));
        chain.add(CostOptimizationStrategy::new(config.cost_weight));
        chain.add(balancer);
        chain
    }

    pub fn add(&mut self, strategy: impl Strategy + 'static) {
        self.add_boxed(Box::new(strategy));
    }

    pub fn add_boxed(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
        // sort_by is stable, so equal priorities keep insertion order
        self.strategies.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Remove every strategy called `name`. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.strategies.len();
        self.strategies.retain(|s| s.name() != name);
        self.strategies.len() != before
    }

    /// Strategy names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn execute(
        &self,
        ctx: &RoutingContext,
        candidates: Vec<Candidate>,
    ) -> Result<RouteDecision, RoutingError> {
        // 0. Nothing to choose from
        if candidates.is_empty() {
            return Err(RoutingError::NoCandidates);
        }
        let considered = candidates.len();

        // 1. Filter then score, strategy by strategy
        let mut working = candidates;
        for strategy in &self.strategies {
            working = strategy.filter(ctx, working);
            if working.is_empty() {
                tracing::debug!(strategy = strategy.name(), "strategy removed every candidate");
                return Err(RoutingError::FilterExhausted {
                    strategy: strategy.name().to_string(),
                });
            }
            strategy.score(ctx, &mut working);
            tracing::trace!(
                strategy = strategy.name(),
                remaining = working.len(),
                "strategy applied"
            );
        }

        // 2. Strictly greatest score wins; earlier candidates keep ties
        let mut winner_idx = 0;
        for (idx, candidate) in working.iter().enumerate().skip(1) {
            if candidate.score() > working[winner_idx].score() {
                winner_idx = idx;
            }
        }
        let winner = working.swap_remove(winner_idx);

        tracing::debug!(
            provider = %winner.provider.id,
            model = %winner.model.id,
            score = winner.score(),
            considered,
            "route selected"
        );

        Ok(RouteDecision::new(winner, considered))
    }
}
