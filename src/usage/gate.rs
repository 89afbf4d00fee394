use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::counters::QuotaCounters;
use super::error::{Collaborator, UsageError};
use super::limits::resolve_limit;
use super::overage::{cents_to_usd, estimate_overage_cents_with, overage_units};
use super::plan::{Limit, SubscriptionWithPlan};
use super::store::{CreditLedger, SubscriptionStore};
use crate::config::MeteringConfig;
use crate::types::{TaskType, UserId};

/// What a committed operation did to the user's quota and balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCharge {
    pub units_before: u64,
    pub units_after: u64,
    pub overage_units: u64,
    pub charged_cents: u64,
}

impl UsageCharge {
    pub fn charged_usd(&self) -> f64 {
        cents_to_usd(self.charged_cents)
    }
}

/// Pre-flight admission and post-hoc metering against a subscription.
///
/// `check_usage` is advisory: it reserves nothing, so concurrent requests can
/// all pass it and then race in `commit_usage`.
pub struct UsageGate {
    subscriptions: Arc<dyn SubscriptionStore>,
    counters: QuotaCounters,
    ledger: Arc<dyn CreditLedger>,
    config: MeteringConfig,
}

impl std::fmt::Debug for UsageGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageGate")
            .field("counters", &self.counters)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl UsageGate {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        counters: QuotaCounters,
        ledger: Arc<dyn CreditLedger>,
    ) -> Self {
        Self {
            subscriptions,
            counters,
            ledger,
            config: MeteringConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MeteringConfig) -> Self {
        self.config = config;
        self
    }

    pub fn counters(&self) -> &QuotaCounters {
        &self.counters
    }

    /// Decide whether a request of `estimated_units` costing `estimated_cost_usd`
    /// may proceed. Mutates nothing.
    pub fn check_usage(
        &self,
        user: &UserId,
        task_type: &str,
        estimated_units: u64,
        estimated_cost_usd: f64,
    ) -> Result<(), UsageError> {
        let task: TaskType = task_type.parse()?;
        validate_cost(estimated_cost_usd)?;
        let SubscriptionWithPlan { subscription, plan } = self.active_subscription(user)?;
        let limit = resolve_limit(&plan, task);

        if let Limit::Capped(ceiling) = plan.daily_requests() {
            let used = self.counters.requests_today(user)?;
            if used >= ceiling {
                tracing::debug!(user = %user, used, ceiling, "daily request ceiling reached");
                return Err(UsageError::RateLimitExceeded {
                    used,
                    limit: ceiling,
                });
            }
        }

        if limit.is_unlimited() || estimated_units == 0 {
            return Ok(());
        }

        let used = self.counters.units_used(user, &subscription.period, task)?;
        let projected = overage_units(used, used.saturating_add(estimated_units), limit);
        if projected == 0 {
            return Ok(());
        }

        let required_cents = estimate_overage_cents_with(
            estimated_units,
            estimated_cost_usd,
            projected,
            self.config.cents_rounding_epsilon,
        );
        let available_cents = self.available_cents(user)?;
        if required_cents > available_cents {
            tracing::debug!(
                user = %user,
                task = task.as_str(),
                projected,
                required_cents,
                available_cents,
                "projected overage exceeds credit balance"
            );
            return Err(UsageError::InsufficientCredits {
                required_cents,
                available_cents,
            });
        }
        Ok(())
    }

    /// Record `units` of usage and bill whatever part of it crossed the plan cap.
    ///
    /// The counter is advanced before credits are deducted. If the deduction
    /// fails the counter stays advanced; no rollback is attempted.
    pub fn commit_usage(
        &self,
        user: &UserId,
        task_type: &str,
        units: u64,
        cost_usd: f64,
    ) -> Result<UsageCharge, UsageError> {
        let task: TaskType = task_type.parse()?;
        validate_cost(cost_usd)?;
        let SubscriptionWithPlan { subscription, plan } = self.active_subscription(user)?;
        let limit = resolve_limit(&plan, task);

        // 1. Advance the counter; its post-increment total pins who crossed the cap
        let units_after = self
            .counters
            .increment(user, &subscription.period, task, units)?;
        let units_before = units_after.saturating_sub(units);

        // 2. Price the overage this operation alone is responsible for
        let overage = overage_units(units_before, units_after, limit);
        let charged_cents = estimate_overage_cents_with(
            units,
            cost_usd,
            overage,
            self.config.cents_rounding_epsilon,
        );

        // 3. Deduct, all or nothing
        if charged_cents > 0 {
            let deducted = self
                .ledger
                .try_deduct(user, charged_cents)
                .map_err(UsageError::store(Collaborator::CreditLedger))?;
            if !deducted {
                let available_cents = self.available_cents(user)?;
                tracing::warn!(
                    user = %user,
                    task = task.as_str(),
                    units_after,
                    charged_cents,
                    available_cents,
                    "overage not covered by credits, usage already recorded"
                );
                return Err(UsageError::InsufficientCredits {
                    required_cents: charged_cents,
                    available_cents,
                });
            }
            tracing::info!(
                user = %user,
                task = task.as_str(),
                overage_units = overage,
                charged_cents,
                "overage charged to credits"
            );
        }

        // 4. Request counter only feeds the daily ceiling
        if let Err(err) = self.counters.increment_requests(user) {
            tracing::warn!(user = %user, error = %err, "failed to count request");
        }

        Ok(UsageCharge {
            units_before,
            units_after,
            overage_units: overage,
            charged_cents,
        })
    }

    fn available_cents(&self, user: &UserId) -> Result<u64, UsageError> {
        self.ledger
            .balance_cents(user)
            .map_err(UsageError::store(Collaborator::CreditLedger))
    }

    fn active_subscription(&self, user: &UserId) -> Result<SubscriptionWithPlan, UsageError> {
        let found = self
            .subscriptions
            .active_with_plan(user)
            .map_err(UsageError::store(Collaborator::Subscriptions))?;
        match found {
            None => Err(UsageError::QuotaExceeded("no active subscription".to_string())),
            Some(sp) if !sp.subscription.status.admits_usage() => Err(UsageError::QuotaExceeded(
                format!("subscription is {}", sp.subscription.status.as_str()),
            )),
            Some(sp) => Ok(sp),
        }
    }
}

fn validate_cost(cost_usd: f64) -> Result<(), UsageError> {
    if !cost_usd.is_finite() || cost_usd < 0.0 {
        return Err(UsageError::InvalidRequest(format!(
            "cost must be a finite non-negative amount, got {cost_usd}"
        )));
    }
    Ok(())
}
