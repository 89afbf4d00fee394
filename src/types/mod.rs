pub mod identifiers;
pub mod metadata;
pub mod task;

pub use identifiers::{ModelId, ProviderId, UserId};
pub use metadata::{Metadata, MetadataValue};
pub use task::{TaskType, TaskTypeError};
