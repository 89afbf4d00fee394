use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::candidate::Candidate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("no candidates to route")]
    NoCandidates,
    #[error("no candidates after {strategy} filtering")]
    FilterExhausted { strategy: String },
}

/// The winning candidate plus enough detail to explain the choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub selected: Candidate,
    pub score_breakdown: BTreeMap<String, f64>,
    pub reasons: Vec<String>,
    /// Size of the candidate set the chain started from.
    pub considered: usize,
}

impl RouteDecision {
    pub(crate) fn new(selected: Candidate, considered: usize) -> Self {
        Self {
            score_breakdown: selected.breakdown().clone(),
            reasons: selected.reasons().to_vec(),
            selected,
            considered,
        }
    }

    pub fn score(&self) -> f64 {
        self.selected.score()
    }
}
