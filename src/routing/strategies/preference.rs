use std::collections::BTreeSet;

use crate::config::DEFAULT_PREFERENCE_BONUS_STEP;
use crate::routing::{Candidate, RoutingContext, Strategy};
use crate::types::ModelId;

use super::USER_PREFERENCE_PRIORITY;

/// Restricts routing to the caller's preferred models, in preference order.
///
/// Soft: if none of the preferred models are present the input passes
/// through untouched.
#[derive(Debug, Clone)]
pub struct UserPreferenceStrategy {
    bonus_step: f64,
}

impl UserPreferenceStrategy {
    pub const NAME: &'static str = "user_preference";

    pub fn new(bonus_step: f64) -> Self {
        Self { bonus_step }
    }
}

impl Default for UserPreferenceStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_PREFERENCE_BONUS_STEP)
    }
}

impl Strategy for UserPreferenceStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        USER_PREFERENCE_PRIORITY
    }

    fn filter(&self, ctx: &RoutingContext, candidates: Vec<Candidate>) -> Vec<Candidate> {
        if ctx.preferred_models.is_empty() {
            return candidates;
        }

        let mut seen: BTreeSet<&ModelId> = BTreeSet::new();
        let mut ordered = Vec::new();
        for preferred in &ctx.preferred_models {
            if !seen.insert(preferred) {
                continue;
            }
            ordered.extend(candidates.iter().filter(|c| &c.model.id == preferred).cloned());
        }

        if ordered.is_empty() {
            tracing::debug!("no preferred model available, keeping all candidates");
            let mut candidates = candidates;
            for candidate in candidates.iter_mut() {
                candidate.add_reason("no preferred model available");
            }
            return candidates;
        }
        ordered
    }

    fn score(&self, ctx: &RoutingContext, candidates: &mut [Candidate]) {
        let n = ctx.preferred_models.len();
        for candidate in candidates.iter_mut() {
            if let Some(rank) = ctx.preference_rank(&candidate.model.id) {
                let bonus = self.bonus_step * (n - rank) as f64;
                candidate.add_score(
                    Self::NAME,
                    bonus,
                    format!("preferred model #{}", rank + 1),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::strategies::fixtures::{candidate, model_ids};

    fn ctx(preferred: &[&str]) -> RoutingContext {
        RoutingContext {
            preferred_models: preferred.iter().map(|m| ModelId::new(*m)).collect(),
            ..RoutingContext::default()
        }
    }

    #[test]
    fn filter_reorders_to_preference_order() {
        let input = vec![candidate("p", "B"), candidate("p", "A")];
        let out = UserPreferenceStrategy::default().filter(&ctx(&["A", "B"]), input);
        assert_eq!(model_ids(&out), vec!["A", "B"]);
    }

    #[test]
    fn filter_drops_non_preferred_when_any_match() {
        let input = vec![candidate("p", "x"), candidate("p", "A"), candidate("p", "y")];
        let out = UserPreferenceStrategy::default().filter(&ctx(&["missing", "A"]), input);
        assert_eq!(model_ids(&out), vec!["A"]);
    }

    #[test]
    fn filter_falls_back_when_nothing_matches() {
        let input = vec![candidate("p", "x"), candidate("p", "y")];
        let out = UserPreferenceStrategy::default().filter(&ctx(&["z"]), input);
        assert_eq!(model_ids(&out), vec!["x", "y"]);
        assert!(out.iter().all(|c| c.reasons() == ["no preferred model available"]));
    }

    #[test]
    fn score_ranks_first_preference_highest() {
        let mut cands = vec![candidate("p", "A"), candidate("p", "B"), candidate("p", "C")];
        UserPreferenceStrategy::default().score(&ctx(&["A", "B"]), &mut cands);
        assert!(cands[0].score() > cands[1].score());
        assert!(cands[1].score() > 0.0);
        assert_eq!(cands[2].score(), 0.0);
    }
}
