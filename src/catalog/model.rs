use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{ModelId, ProviderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Chat,
    Vision,
    Tools,
    Stream,
    Json,
    Embedding,
}

/// Ordered capability set. Ordering keeps serialized output stable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities {
    inner: BTreeSet<Capability>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, capability: Capability) {
        self.inner.insert(capability);
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.inner.contains(&capability)
    }

    /// True when every capability in `required` is present here.
    pub fn is_superset(&self, required: &Capabilities) -> bool {
        self.inner.is_superset(&required.inner)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.inner.iter()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// A servable model. Costs are USD per 1K tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: ModelId,
    pub provider_id: ProviderId,
    pub capabilities: Capabilities,
    pub context_window: u64,
    pub max_output_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub enabled: bool,
}

impl Model {
    pub fn new(id: impl Into<ModelId>, provider_id: impl Into<ProviderId>) -> Self {
        Self {
            id: id.into(),
            provider_id: provider_id.into(),
            capabilities: [Capability::Chat].into_iter().collect(),
            context_window: 0,
            max_output_tokens: 0,
            input_cost: 0.0,
            output_cost: 0.0,
            enabled: true,
        }
    }

    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities = capabilities.into_iter().collect();
        self
    }

    pub fn with_context_window(mut self, tokens: u64) -> Self {
        self.context_window = tokens;
        self
    }

    pub fn with_costs(mut self, input_cost: f64, output_cost: f64) -> Self {
        self.input_cost = input_cost;
        self.output_cost = output_cost;
        self
    }

    pub fn unit_cost(&self) -> f64 {
        self.input_cost + self.output_cost
    }
}
