//! Quota admission and overage metering.
//!
//! [`UsageGate::check_usage`] answers "may this request run?" without
//! changing anything. [`UsageGate::commit_usage`] records what actually ran
//! and bills any part of it past the plan cap from the credit balance.

pub mod counters;
pub mod error;
pub mod gate;
pub mod limits;
pub mod memory;
pub mod overage;
pub mod plan;
pub mod store;

pub use counters::QuotaCounters;
pub use error::{Collaborator, StoreError, UsageError};
pub use gate::{UsageCharge, UsageGate};
pub use limits::{resolve_limit, resolve_task_limit};
pub use memory::{MemoryCounterStore, MemoryCreditLedger, MemorySubscriptionStore, MemoryUsageLog, UsageRecord};
pub use overage::{cents_to_usd, estimate_overage_cents, estimate_overage_cents_with, overage_units};
pub use plan::{BillingPeriod, Limit, Plan, Subscription, SubscriptionStatus, SubscriptionWithPlan};
pub use store::{Clock, CounterStore, CreditLedger, FixedClock, SubscriptionStore, SystemClock, UsageLog};
