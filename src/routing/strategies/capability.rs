use crate::routing::{Candidate, RoutingContext, Strategy};

use super::CAPABILITY_FILTER_PRIORITY;

/// Keeps only models that have every capability the request requires.
///
/// The one strict strategy: it has no fallback and may return an empty set,
/// because a model without e.g. vision cannot serve a vision request at all.
#[derive(Debug, Clone, Default)]
pub struct CapabilityFilterStrategy;

impl CapabilityFilterStrategy {
    pub const NAME: &'static str = "capability_filter";
}

impl Strategy for CapabilityFilterStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        CAPABILITY_FILTER_PRIORITY
    }

    fn filter(&self, ctx: &RoutingContext, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let required = ctx.required_capabilities();
        candidates
            .into_iter()
            .filter(|c| c.model.capabilities.is_superset(&required))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Capability;
    use crate::routing::strategies::fixtures::{model_ids, with_caps};

    #[test]
    fn keeps_supersets_only() {
        let ctx = RoutingContext {
            requires_vision: true,
            ..RoutingContext::default()
        };
        let input = vec![
            with_caps("p", "text", &[Capability::Chat]),
            with_caps("p", "eyes", &[Capability::Chat, Capability::Vision, Capability::Tools]),
            with_caps("p", "vision-only", &[Capability::Vision]),
        ];
        let out = CapabilityFilterStrategy.filter(&ctx, input);
        assert_eq!(model_ids(&out), vec!["eyes"]);
    }

    #[test]
    fn may_return_empty() {
        let ctx = RoutingContext {
            requires_tools: true,
            ..RoutingContext::default()
        };
        let input = vec![with_caps("p", "text", &[Capability::Chat])];
        assert!(CapabilityFilterStrategy.filter(&ctx, input).is_empty());
    }
}
