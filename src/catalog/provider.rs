use serde::{Deserialize, Serialize};

use crate::types::ProviderId;

/// An upstream AI vendor as the registry describes it. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub enabled: bool,
    pub weight: u32,
    /// Higher first when candidates are assembled from a registry.
    pub priority: i32,
}

impl Provider {
    pub fn new(id: impl Into<ProviderId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            weight: 1,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
