pub mod model;
pub mod provider;
pub mod registry;

pub use model::{Capabilities, Capability, Model};
pub use provider::Provider;
pub use registry::{InMemoryRegistry, ProviderRegistry};
