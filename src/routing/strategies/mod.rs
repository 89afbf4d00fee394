//! Built-in strategies, listed here by the priority they run at.

pub mod capability;
pub mod context_window;
pub mod cost;
pub mod health;
pub mod load_balancing;
pub mod preference;

pub use capability::CapabilityFilterStrategy;
pub use context_window::ContextWindowStrategy;
pub use cost::CostOptimizationStrategy;
pub use health::HealthFilterStrategy;
pub use load_balancing::LoadBalancingStrategy;
pub use preference::UserPreferenceStrategy;

pub const USER_PREFERENCE_PRIORITY: i32 = 100;
pub const HEALTH_FILTER_PRIORITY: i32 = 90;
pub const CAPABILITY_FILTER_PRIORITY: i32 = 80;
pub const CONTEXT_WINDOW_PRIORITY: i32 = 70;
pub const COST_OPTIMIZATION_PRIORITY: i32 = 50;
pub const LOAD_BALANCING_PRIORITY: i32 = 10;
