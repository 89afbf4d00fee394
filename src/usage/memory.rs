//! Mutex-backed implementations of every usage port.
//!
//! Each store applies its operation under one lock, which gives the same
//! atomicity the ports require of a real backend. Suitable for tests and for
//! single-process deployments.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};

use super::error::StoreError;
use super::plan::{BillingPeriod, SubscriptionWithPlan};
use super::store::{CounterStore, CreditLedger, SubscriptionStore, UsageLog};
use crate::types::{TaskType, UserId};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn unavailable(what: &str) -> StoreError {
    StoreError::Unavailable(format!("{what} is offline"))
}

#[derive(Debug, Default)]
struct Counters {
    tokens: BTreeMap<(UserId, DateTime<Utc>), u64>,
    media: BTreeMap<(UserId, DateTime<Utc>, TaskType), u64>,
    requests: BTreeMap<(UserId, NaiveDate), u64>,
}

/// Counter store with cache semantics: unknown keys read as a cache miss,
/// increments on unknown keys start from zero.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: Mutex<Counters>,
    fail_reads: AtomicBool,
    fail_increments: AtomicBool,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tokens(&self, user: &UserId, period_start: DateTime<Utc>, value: u64) {
        locked(&self.counters)
            .tokens
            .insert((user.clone(), period_start), value);
    }

    pub fn set_media_units(&self, user: &UserId, period_start: DateTime<Utc>, task: TaskType, value: u64) {
        locked(&self.counters)
            .media
            .insert((user.clone(), period_start, task), value);
    }

    pub fn set_requests(&self, user: &UserId, day: NaiveDate, value: u64) {
        locked(&self.counters)
            .requests
            .insert((user.clone(), day), value);
    }

    /// Drop every counter, as a cache flush or rollover would.
    pub fn evict_all(&self) {
        *locked(&self.counters) = Counters::default();
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_increments(&self, fail: bool) {
        self.fail_increments.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable("counter store"));
        }
        Ok(())
    }

    fn check_increments(&self) -> Result<(), StoreError> {
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(unavailable("counter store"));
        }
        Ok(())
    }
}

impl CounterStore for MemoryCounterStore {
    fn tokens_used(&self, user: &UserId, period_start: DateTime<Utc>) -> Result<u64, StoreError> {
        self.check_reads()?;
        locked(&self.counters)
            .tokens
            .get(&(user.clone(), period_start))
            .copied()
            .ok_or(StoreError::CacheMiss)
    }

    fn media_units_used(
        &self,
        user: &UserId,
        period_start: DateTime<Utc>,
        task: TaskType,
    ) -> Result<u64, StoreError> {
        self.check_reads()?;
        locked(&self.counters)
            .media
            .get(&(user.clone(), period_start, task))
            .copied()
            .ok_or(StoreError::CacheMiss)
    }

    fn increment_tokens(
        &self,
        user: &UserId,
        period: &BillingPeriod,
        delta: u64,
    ) -> Result<u64, StoreError> {
        self.check_increments()?;
        let mut counters = locked(&self.counters);
        let total = counters.tokens.entry((user.clone(), period.start)).or_insert(0);
        *total = total.saturating_add(delta);
        Ok(*total)
    }

    fn increment_media_units(
        &self,
        user: &UserId,
        period: &BillingPeriod,
        task: TaskType,
        delta: u64,
    ) -> Result<u64, StoreError> {
        self.check_increments()?;
        let mut counters = locked(&self.counters);
        let total = counters
            .media
            .entry((user.clone(), period.start, task))
            .or_insert(0);
        *total = total.saturating_add(delta);
        Ok(*total)
    }

    fn requests_today(&self, user: &UserId, day: NaiveDate) -> Result<u64, StoreError> {
        self.check_reads()?;
        locked(&self.counters)
            .requests
            .get(&(user.clone(), day))
            .copied()
            .ok_or(StoreError::CacheMiss)
    }

    fn increment_requests(&self, user: &UserId, day: NaiveDate) -> Result<u64, StoreError> {
        self.check_increments()?;
        let mut counters = locked(&self.counters);
        let total = counters.requests.entry((user.clone(), day)).or_insert(0);
        *total += 1;
        Ok(*total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub user: UserId,
    pub task: TaskType,
    pub units: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only usage log. Every record also counts as one request on its day.
#[derive(Debug, Default)]
pub struct MemoryUsageLog {
    records: Mutex<Vec<UsageRecord>>,
    offline: AtomicBool,
}

impl MemoryUsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, user: &UserId, task: TaskType, units: u64, recorded_at: DateTime<Utc>) {
        locked(&self.records).push(UsageRecord {
            user: user.clone(),
            task,
            units,
            recorded_at,
        });
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn sum(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
        matches: impl Fn(TaskType) -> bool,
    ) -> Result<u64, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(unavailable("usage log"));
        }
        Ok(locked(&self.records)
            .iter()
            .filter(|r| &r.user == user && r.recorded_at >= since && matches(r.task))
            .map(|r| r.units)
            .sum())
    }
}

impl UsageLog for MemoryUsageLog {
    fn tokens_since(&self, user: &UserId, since: DateTime<Utc>) -> Result<u64, StoreError> {
        self.sum(user, since, |task| task.is_token_metered())
    }

    fn media_units_since(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
        task: TaskType,
    ) -> Result<u64, StoreError> {
        self.sum(user, since, |t| t == task)
    }

    fn requests_on(&self, user: &UserId, day: NaiveDate) -> Result<u64, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(unavailable("usage log"));
        }
        Ok(locked(&self.records)
            .iter()
            .filter(|r| &r.user == user && r.recorded_at.date_naive() == day)
            .count() as u64)
    }
}

/// Credit balances with deduct-if-sufficient under a single lock.
#[derive(Debug, Default)]
pub struct MemoryCreditLedger {
    balances: Mutex<BTreeMap<UserId, u64>>,
    calls: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryCreditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, user: &UserId, cents: u64) {
        locked(&self.balances).insert(user.clone(), cents);
    }

    pub fn balance(&self, user: &UserId) -> u64 {
        locked(&self.balances).get(user).copied().unwrap_or(0)
    }

    /// How many deductions have been attempted, successful or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl CreditLedger for MemoryCreditLedger {
    fn balance_cents(&self, user: &UserId) -> Result<u64, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(unavailable("credit ledger"));
        }
        Ok(self.balance(user))
    }

    fn try_deduct(&self, user: &UserId, cents: u64) -> Result<bool, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(unavailable("credit ledger"));
        }
        let mut balances = locked(&self.balances);
        let balance = balances.entry(user.clone()).or_insert(0);
        if *balance < cents {
            return Ok(false);
        }
        *balance -= cents;
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct MemorySubscriptionStore {
    entries: Mutex<BTreeMap<UserId, SubscriptionWithPlan>>,
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entry: SubscriptionWithPlan) {
        locked(&self.entries).insert(entry.subscription.user_id.clone(), entry);
    }
}

impl SubscriptionStore for MemorySubscriptionStore {
    fn active_with_plan(&self, user: &UserId) -> Result<Option<SubscriptionWithPlan>, StoreError> {
        Ok(locked(&self.entries).get(user).cloned())
    }
}
