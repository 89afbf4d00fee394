use crate::config::DEFAULT_COST_WEIGHT;
use crate::routing::{Candidate, Optimization, RoutingContext, Strategy};

use super::COST_OPTIMIZATION_PRIORITY;

/// Favours cheaper models, but only when the caller asked to optimize for cost.
#[derive(Debug, Clone)]
pub struct CostOptimizationStrategy {
    weight: f64,
}

impl CostOptimizationStrategy {
    pub const NAME: &'static str = "cost_optimization";

    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl Default for CostOptimizationStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_COST_WEIGHT)
    }
}

impl Strategy for CostOptimizationStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        COST_OPTIMIZATION_PRIORITY
    }

    fn score(&self, ctx: &RoutingContext, candidates: &mut [Candidate]) {
        if ctx.optimize != Optimization::Cost {
            return;
        }
        for candidate in candidates.iter_mut() {
            let cost = candidate.model.unit_cost().max(0.0);
            let points = self.weight / (1.0 + cost);
            candidate.add_score(Self::NAME, points, format!("unit cost ${cost:.6}/1K tokens"));
        }
    }
}
