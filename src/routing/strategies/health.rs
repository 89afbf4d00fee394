use crate::routing::{Candidate, RoutingContext, Strategy};

use super::HEALTH_FILTER_PRIORITY;

/// Drops providers explicitly reported unhealthy. Unknown health counts as healthy.
#[derive(Debug, Clone, Default)]
pub struct HealthFilterStrategy;

impl HealthFilterStrategy {
    pub const NAME: &'static str = "health_filter";
}

impl Strategy for HealthFilterStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        HEALTH_FILTER_PRIORITY
    }

    fn filter(&self, ctx: &RoutingContext, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        let healthy: Vec<Candidate> = candidates
            .iter()
            .filter(|c| ctx.is_provider_healthy(&c.provider.id))
            .cloned()
            .collect();

        if healthy.is_empty() {
            tracing::debug!("all providers unhealthy, keeping all candidates");
            for candidate in candidates.iter_mut() {
                candidate.add_reason("kept although provider is unhealthy");
            }
            return candidates;
        }
        healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::strategies::fixtures::{candidate, model_ids};
    use crate::types::ProviderId;

    #[test]
    fn drops_only_explicitly_unhealthy() {
        let mut ctx = RoutingContext::default();
        ctx.provider_health.insert(ProviderId::new("down"), false);
        ctx.provider_health.insert(ProviderId::new("up"), true);

        let input = vec![
            candidate("down", "a"),
            candidate("up", "b"),
            candidate("unknown", "c"),
        ];
        let out = HealthFilterStrategy.filter(&ctx, input);
        assert_eq!(model_ids(&out), vec!["b", "c"]);
    }

    #[test]
    fn keeps_everything_when_all_down() {
        let mut ctx = RoutingContext::default();
        ctx.provider_health.insert(ProviderId::new("a"), false);
        ctx.provider_health.insert(ProviderId::new("b"), false);

        let input = vec![candidate("a", "m1"), candidate("b", "m2")];
        let out = HealthFilterStrategy.filter(&ctx, input);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|c| c.reasons() == ["kept although provider is unhealthy"]));
        assert!(out.iter().all(|c| c.score() == 0.0));
    }
}
