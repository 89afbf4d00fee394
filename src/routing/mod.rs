//! Provider/model selection.
//!
//! A [`Router`] runs a [`StrategyChain`] over a candidate set: each strategy,
//! in descending priority, narrows the set and adds to candidate scores, and
//! the highest total wins. See [`strategies`] for the built-ins.

pub mod candidate;
pub mod chain;
pub mod context;
pub mod decision;
pub mod strategies;
pub mod strategy;

use crate::catalog::ProviderRegistry;
use crate::config::RoutingConfig;

pub use candidate::{collect_candidates, Candidate};
pub use chain::StrategyChain;
pub use context::{Optimization, RoutingContext};
pub use decision::{RouteDecision, RoutingError};
pub use strategy::Strategy;

#[derive(Debug)]
pub struct Router {
    chain: StrategyChain,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(StrategyChain::default_chain(&RoutingConfig::default()))
    }
}

impl Router {
    pub fn new(chain: StrategyChain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &StrategyChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut StrategyChain {
        &mut self.chain
    }

    pub fn route(
        &self,
        ctx: &RoutingContext,
        candidates: Vec<Candidate>,
    ) -> Result<RouteDecision, RoutingError> {
        self.chain.execute(ctx, candidates)
    }

    /// Route over everything enabled in `registry`.
    ///
    /// Health the caller already put in `ctx` wins over what the registry
    /// reports; `ctx` itself is left untouched.
    pub fn route_registry(
        &self,
        registry: &dyn ProviderRegistry,
        ctx: &RoutingContext,
    ) -> Result<RouteDecision, RoutingError> {
        let candidates = collect_candidates(registry);

        let mut derived = ctx.clone();
        for candidate in &candidates {
            let id = &candidate.provider.id;
            if derived.provider_health.contains_key(id) {
                continue;
            }
            if let Some(healthy) = registry.health(id) {
                derived.provider_health.insert(id.clone(), healthy);
            }
        }

        self.chain.execute(&derived, candidates)
    }
}
