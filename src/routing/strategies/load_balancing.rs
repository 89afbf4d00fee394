use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DEFAULT_JITTER_EPSILON;
use crate::routing::{Candidate, RoutingContext, Strategy};

use super::LOAD_BALANCING_PRIORITY;

/// Adds a small random jitter in (0, epsilon) so exact ties spread across candidates.
///
/// The random source is owned by the strategy; seed it for reproducible routing.
#[derive(Debug)]
pub struct LoadBalancingStrategy {
    epsilon: f64,
    rng: Mutex<StdRng>,
}

impl LoadBalancingStrategy {
    pub const NAME: &'static str = "load_balancing";

    pub fn new(epsilon: f64) -> Self {
        Self::with_rng(epsilon, StdRng::from_entropy())
    }

    pub fn with_seed(epsilon: f64, seed: u64) -> Self {
        Self::with_rng(epsilon, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(epsilon: f64, rng: StdRng) -> Self {
        Self {
            epsilon,
            rng: Mutex::new(rng),
        }
    }
}

impl Default for LoadBalancingStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_JITTER_EPSILON)
    }
}

impl Strategy for LoadBalancingStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        LOAD_BALANCING_PRIORITY
    }

    fn score(&self, _ctx: &RoutingContext, candidates: &mut [Candidate]) {
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for candidate in candidates.iter_mut() {
            let jitter = rng.gen_range(0.0..self.epsilon).max(f64::MIN_POSITIVE);
            candidate.add_score(Self::NAME, jitter, "load balancing jitter");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::strategies::fixtures::candidate;

    #[test]
    fn jitter_is_bounded_and_positive() {
        let strategy = LoadBalancingStrategy::with_seed(0.1, 7);
        let mut cands: Vec<Candidate> = (0..64).map(|i| candidate("p", &format!("m{i}"))).collect();
        strategy.score(&RoutingContext::default(), &mut cands);
        assert!(cands.iter().all(|c| c.score() > 0.0 && c.score() < 0.1));
    }

    #[test]
    fn same_seed_same_jitter() {
        let ctx = RoutingContext::default();
        let mut a = vec![candidate("p", "x"), candidate("p", "y")];
        let mut b = a.clone();
        LoadBalancingStrategy::with_seed(0.1, 42).score(&ctx, &mut a);
        LoadBalancingStrategy::with_seed(0.1, 42).score(&ctx, &mut b);
        assert_eq!(a[0].score(), b[0].score());
        assert_eq!(a[1].score(), b[1].score());
    }

    #[test]
    fn unusable_epsilon_adds_nothing() {
        let ctx = RoutingContext::default();
        for epsilon in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut cands = vec![candidate("p", "x")];
            LoadBalancingStrategy::with_seed(epsilon, 1).score(&ctx, &mut cands);
            assert_eq!(cands[0].score(), 0.0, "epsilon {epsilon}");
        }
    }
}
