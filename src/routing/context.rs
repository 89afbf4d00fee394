use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Capabilities, Capability};
use crate::types::{Metadata, ModelId, ProviderId, TaskType};

/// What the caller wants the router to favour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimization {
    #[default]
    Balanced,
    Cost,
    Quality,
    Latency,
}

/// Per-request routing parameters. Strategies only ever read it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingContext {
    pub task_type: TaskType,
    /// Most preferred first.
    pub preferred_models: Vec<ModelId>,
    /// Absent entries mean "assume healthy".
    pub provider_health: BTreeMap<ProviderId, bool>,
    pub requires_vision: bool,
    pub requires_tools: bool,
    pub requires_stream: bool,
    pub requires_json: bool,
    pub estimated_tokens: u64,
    pub min_context_window: Option<u64>,
    pub optimize: Optimization,
    pub metadata: Metadata,
}

impl RoutingContext {
    pub fn new(task_type: TaskType) -> Self {
        Self {
            task_type,
            ..Self::default()
        }
    }

    /// Capabilities a model must have to serve this request. Always includes chat.
    pub fn required_capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.insert(Capability::Chat);
        if self.requires_vision {
            caps.insert(Capability::Vision);
        }
        if self.requires_tools {
            caps.insert(Capability::Tools);
        }
        if self.requires_stream {
            caps.insert(Capability::Stream);
        }
        if self.requires_json {
            caps.insert(Capability::Json);
        }
        caps
    }

    pub fn is_provider_healthy(&self, provider: &ProviderId) -> bool {
        self.provider_health.get(provider).copied().unwrap_or(true)
    }

    /// Zero-based rank of `model` in the preference list, if listed.
    pub fn preference_rank(&self, model: &ModelId) -> Option<usize> {
        self.preferred_models.iter().position(|m| m == model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_capabilities_always_include_chat() {
        let ctx = RoutingContext::default();
        let caps = ctx.required_capabilities();
        assert_eq!(caps.len(), 1);
        assert!(caps.contains(Capability::Chat));
    }

    #[test]
    fn required_capabilities_follow_flags() {
        let ctx = RoutingContext {
            requires_vision: true,
            requires_json: true,
            ..RoutingContext::default()
        };
        let caps: Vec<Capability> = ctx.required_capabilities().iter().copied().collect();
        assert_eq!(caps, vec![Capability::Chat, Capability::Vision, Capability::Json]);
    }

    #[test]
    fn unknown_health_is_healthy() {
        let mut ctx = RoutingContext::default();
        ctx.provider_health.insert(ProviderId::new("down"), false);
        ctx.provider_health.insert(ProviderId::new("up"), true);
        assert!(!ctx.is_provider_healthy(&ProviderId::new("down")));
        assert!(ctx.is_provider_healthy(&ProviderId::new("up")));
        assert!(ctx.is_provider_healthy(&ProviderId::new("never-seen")));
    }

    #[test]
    fn default_task_type_is_chat() {
        assert_eq!(RoutingContext::default().task_type, TaskType::Chat);
    }
}
