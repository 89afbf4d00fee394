//! Provider routing and usage metering engine for AI gateways.
//!
//! `relay-core` decides which upstream provider/model serves a request and
//! gates that request against a subscription's quota and credit balance.
//! Routing runs an ordered chain of filter-and-score strategies over the
//! candidate set; metering uses cache-first atomic counters and bills any
//! usage past the plan cap in whole cents, rounded up.
//!
//! Everything is synchronous and in-process. Shared state (counters, credit
//! balances, subscriptions) lives behind the ports in [`usage::store`].

pub mod catalog;
pub mod config;
pub mod routing;
pub mod types;
pub mod usage;

pub use catalog::{Capability, Model, Provider, ProviderRegistry};
pub use config::{ConfigError, EngineConfig, MeteringConfig, RoutingConfig};
pub use routing::{Candidate, RouteDecision, Router, RoutingContext, RoutingError, StrategyChain};
pub use usage::{UsageCharge, UsageError, UsageGate};
