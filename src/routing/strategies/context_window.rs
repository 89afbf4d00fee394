use crate::config::{DEFAULT_CONTEXT_WINDOW_WEIGHT, DEFAULT_OUTPUT_TOKEN_BUFFER};
use crate::routing::{Candidate, RoutingContext, Strategy};

use super::CONTEXT_WINDOW_PRIORITY;

/// Keeps models whose window fits the prompt plus room for the reply.
///
/// When nothing fits, falls back to the candidate(s) with the largest
/// window, which is the best the caller can get.
#[derive(Debug, Clone)]
pub struct ContextWindowStrategy {
    output_buffer: u64,
    weight: f64,
}

impl ContextWindowStrategy {
    pub const NAME: &'static str = "context_window";

    pub fn new(output_buffer: u64, weight: f64) -> Self {
        Self {
            output_buffer,
            weight,
        }
    }

    fn fits(&self, ctx: &RoutingContext, window: u64) -> bool {
        let needed = ctx.estimated_tokens.saturating_add(self.output_buffer);
        window >= needed && ctx.min_context_window.map_or(true, |min| window >= min)
    }
}

impl Default for ContextWindowStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_TOKEN_BUFFER, DEFAULT_CONTEXT_WINDOW_WEIGHT)
    }
}

impl Strategy for ContextWindowStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        CONTEXT_WINDOW_PRIORITY
    }

    fn filter(&self, ctx: &RoutingContext, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let fitting: Vec<Candidate> = candidates
            .iter()
            .filter(|c| self.fits(ctx, c.model.context_window))
            .cloned()
            .collect();
        if !fitting.is_empty() {
            return fitting;
        }

        let Some(largest) = candidates.iter().map(|c| c.model.context_window).max() else {
            return candidates;
        };
        tracing::debug!(
            estimated_tokens = ctx.estimated_tokens,
            largest,
            "no model fits the request, keeping the largest window"
        );
        candidates
            .into_iter()
            .filter(|c| c.model.context_window == largest)
            .map(|mut c| {
                c.add_reason(format!("largest window available ({largest} tokens)"));
                c
            })
            .collect()
    }

    fn score(&self, _ctx: &RoutingContext, candidates: &mut [Candidate]) {
        for candidate in candidates.iter_mut() {
            let window = candidate.model.context_window;
            // ln(1 + k) keeps the bonus positive and strictly increasing in window size.
            let points = self.weight * (window as f64 / 1000.0).ln_1p();
            candidate.add_score(Self::NAME, points, format!("context window {window} tokens"));
        }
    }
}
