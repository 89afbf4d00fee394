use std::collections::BTreeMap;

use super::model::Model;
use super::provider::Provider;
use crate::types::ProviderId;

/// Read-only view of the provider/model catalog.
pub trait ProviderRegistry: Send + Sync {
    fn providers(&self) -> Vec<Provider>;

    fn models(&self, provider: &ProviderId) -> Vec<Model>;

    /// `None` means health is unknown, which routing treats as healthy.
    fn health(&self, provider: &ProviderId) -> Option<bool>;
}

/// Static registry, useful for embedding a fixed catalog and for tests.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    providers: Vec<Provider>,
    models: BTreeMap<ProviderId, Vec<Model>>,
    health: BTreeMap<ProviderId, bool>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_provider(&mut self, provider: Provider) {
        self.providers.retain(|p| p.id != provider.id);
        self.providers.push(provider);
    }

    pub fn add_model(&mut self, model: Model) {
        self.models
            .entry(model.provider_id.clone())
            .or_default()
            .push(model);
    }

    pub fn set_health(&mut self, provider: impl Into<ProviderId>, healthy: bool) {
        self.health.insert(provider.into(), healthy);
    }
}

impl ProviderRegistry for InMemoryRegistry {
    fn providers(&self) -> Vec<Provider> {
        self.providers.clone()
    }

    fn models(&self, provider: &ProviderId) -> Vec<Model> {
        self.models.get(provider).cloned().unwrap_or_default()
    }

    fn health(&self, provider: &ProviderId) -> Option<bool> {
        self.health.get(provider).copied()
    }
}
