use std::sync::Arc;

use super::error::{Collaborator, StoreError, UsageError};
use super::plan::BillingPeriod;
use super::store::{Clock, CounterStore, SystemClock, UsageLog};
use crate::types::{TaskType, UserId};

/// Cache-first usage counters with the usage log as fallback.
///
/// Holds no state of its own: the counter store's atomic increment is the
/// only serialization point between concurrent writers.
#[derive(Clone)]
pub struct QuotaCounters {
    store: Arc<dyn CounterStore>,
    log: Arc<dyn UsageLog>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for QuotaCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaCounters").finish_non_exhaustive()
    }
}

impl QuotaCounters {
    pub fn new(store: Arc<dyn CounterStore>, log: Arc<dyn UsageLog>) -> Self {
        Self {
            store,
            log,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Units of `task` used so far in `period`.
    pub fn units_used(
        &self,
        user: &UserId,
        period: &BillingPeriod,
        task: TaskType,
    ) -> Result<u64, UsageError> {
        let cached = if task.is_token_metered() {
            self.store.tokens_used(user, period.start)
        } else {
            self.store.media_units_used(user, period.start, task)
        };

        match cached {
            Ok(used) => Ok(used),
            Err(err) => {
                log_read_fallback(&err, user, task.as_str());
                self.durable_units(user, period, task)
            }
        }
    }

    /// Add `delta` and return the new period total.
    ///
    /// If the increment itself fails the total is rebuilt from the usage log
    /// plus `delta`. That value is best-effort: concurrent writers on the same
    /// fallback path can each count the other's units.
    pub fn increment(
        &self,
        user: &UserId,
        period: &BillingPeriod,
        task: TaskType,
        delta: u64,
    ) -> Result<u64, UsageError> {
        let incremented = if task.is_token_metered() {
            self.store.increment_tokens(user, period, delta)
        } else {
            self.store.increment_media_units(user, period, task, delta)
        };

        match incremented {
            Ok(total) => Ok(total),
            Err(err) => {
                tracing::warn!(
                    user = %user,
                    task = task.as_str(),
                    error = %err,
                    "counter increment failed, deriving total from usage log"
                );
                let durable = self
                    .durable_units(user, period, task)
                    .map_err(|_| UsageError::Store {
                        collaborator: Collaborator::Counters,
                        source: err,
                    })?;
                Ok(durable.saturating_add(delta))
            }
        }
    }

    pub fn requests_today(&self, user: &UserId) -> Result<u64, UsageError> {
        let day = self.clock.today();
        match self.store.requests_today(user, day) {
            Ok(count) => Ok(count),
            Err(err) => {
                log_read_fallback(&err, user, "requests");
                self.log
                    .requests_on(user, day)
                    .map_err(UsageError::store(Collaborator::UsageLog))
            }
        }
    }

    pub fn increment_requests(&self, user: &UserId) -> Result<u64, UsageError> {
        self.store
            .increment_requests(user, self.clock.today())
            .map_err(UsageError::store(Collaborator::Counters))
    }

    fn durable_units(
        &self,
        user: &UserId,
        period: &BillingPeriod,
        task: TaskType,
    ) -> Result<u64, UsageError> {
        let summed = if task.is_token_metered() {
            self.log.tokens_since(user, period.start)
        } else {
            self.log.media_units_since(user, period.start, task)
        };
        summed.map_err(UsageError::store(Collaborator::UsageLog))
    }
}

fn log_read_fallback(err: &StoreError, user: &UserId, counter: &str) {
    match err {
        StoreError::CacheMiss => {
            tracing::debug!(user = %user, counter, "counter cache miss, reading usage log");
        }
        other => {
            tracing::warn!(user = %user, counter, error = %other, "counter read failed, reading usage log");
        }
    }
}
