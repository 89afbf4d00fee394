use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Model, Provider, ProviderRegistry};

/// A provider/model pairing under evaluation for one routing call.
///
/// The total score starts at zero and only grows through [`Candidate::add_score`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub provider: Provider,
    pub model: Model,
    score: f64,
    breakdown: BTreeMap<String, f64>,
    reasons: Vec<String>,
}

impl Candidate {
    pub fn new(provider: Provider, model: Model) -> Self {
        Self {
            provider,
            model,
            score: 0.0,
            breakdown: BTreeMap::new(),
            reasons: Vec::new(),
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn breakdown(&self) -> &BTreeMap<String, f64> {
        &self.breakdown
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Credit `points` to this candidate on behalf of `strategy`.
    ///
    /// Negative or non-finite points are dropped; the total never decreases.
    pub fn add_score(&mut self, strategy: &str, points: f64, reason: impl Into<String>) {
        if !points.is_finite() || points < 0.0 {
            tracing::warn!(strategy, points, "dropping invalid score delta");
            return;
        }
        self.score += points;
        *self.breakdown.entry(strategy.to_string()).or_insert(0.0) += points;
        self.reasons.push(reason.into());
    }

    pub fn add_reason(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }
}

/// Pair every enabled provider with each of its enabled models.
///
/// Providers are visited by descending priority, then id, so the resulting
/// order is stable for a given registry state.
pub fn collect_candidates(registry: &dyn ProviderRegistry) -> Vec<Candidate> {
    let mut providers: Vec<Provider> = registry
        .providers()
        .into_iter()
        .filter(|p| p.enabled)
        .collect();
    providers.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));

    let mut candidates = Vec::new();
    for provider in providers {
        let mut models: Vec<Model> = registry
            .models(&provider.id)
            .into_iter()
            .filter(|m| m.enabled && m.provider_id == provider.id)
            .collect();
        models.sort_by(|a, b| a.id.cmp(&b.id));
        for model in models {
            candidates.push(Candidate::new(provider.clone(), model));
        }
    }
    candidates
}
