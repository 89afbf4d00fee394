//! Ports to the collaborators that own shared state.
//!
//! Every call is a single blocking attempt; implementations decide their own
//! timeouts. Nothing here is retried by this crate.

use chrono::{DateTime, NaiveDate, Utc};

use super::error::StoreError;
use super::plan::{BillingPeriod, SubscriptionWithPlan};
use crate::types::{TaskType, UserId};

pub trait SubscriptionStore: Send + Sync {
    /// The user's current subscription and its plan, if any.
    fn active_with_plan(&self, user: &UserId) -> Result<Option<SubscriptionWithPlan>, StoreError>;
}

/// Fast, atomically incremented usage counters.
///
/// Reads may fail with [`StoreError::CacheMiss`]. Increments are atomic and
/// return the post-increment total; an absent counter starts from zero.
pub trait CounterStore: Send + Sync {
    fn tokens_used(&self, user: &UserId, period_start: DateTime<Utc>) -> Result<u64, StoreError>;

    fn media_units_used(
        &self,
        user: &UserId,
        period_start: DateTime<Utc>,
        task: TaskType,
    ) -> Result<u64, StoreError>;

    fn increment_tokens(
        &self,
        user: &UserId,
        period: &BillingPeriod,
        delta: u64,
    ) -> Result<u64, StoreError>;

    fn increment_media_units(
        &self,
        user: &UserId,
        period: &BillingPeriod,
        task: TaskType,
        delta: u64,
    ) -> Result<u64, StoreError>;

    fn requests_today(&self, user: &UserId, day: NaiveDate) -> Result<u64, StoreError>;

    fn increment_requests(&self, user: &UserId, day: NaiveDate) -> Result<u64, StoreError>;
}

/// Durable usage records. Source of truth when a counter is missing.
pub trait UsageLog: Send + Sync {
    /// Chat and embedding tokens recorded at or after `since`.
    fn tokens_since(&self, user: &UserId, since: DateTime<Utc>) -> Result<u64, StoreError>;

    fn media_units_since(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
        task: TaskType,
    ) -> Result<u64, StoreError>;

    fn requests_on(&self, user: &UserId, day: NaiveDate) -> Result<u64, StoreError>;
}

/// Spendable balance in integer cents.
pub trait CreditLedger: Send + Sync {
    /// Current spendable balance. This is the live figure, not a snapshot.
    fn balance_cents(&self, user: &UserId) -> Result<u64, StoreError>;

    /// Deduct `cents` only if the balance covers it, atomically.
    /// `Ok(false)` means the balance was insufficient and nothing changed.
    fn try_deduct(&self, user: &UserId, cents: u64) -> Result<bool, StoreError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
