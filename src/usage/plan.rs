use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A plan cap. Plans store caps as integers where any negative value
/// (conventionally -1) means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Limit {
    Unlimited,
    Capped(u64),
}

impl Limit {
    pub fn from_raw(raw: i64) -> Self {
        if raw < 0 {
            Limit::Unlimited
        } else {
            Limit::Capped(raw as u64)
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Limit::Unlimited)
    }

    pub fn cap(&self) -> Option<u64> {
        match self {
            Limit::Unlimited => None,
            Limit::Capped(cap) => Some(*cap),
        }
    }
}

impl From<i64> for Limit {
    fn from(raw: i64) -> Self {
        Limit::from_raw(raw)
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> Self {
        match limit {
            Limit::Unlimited => -1,
            Limit::Capped(cap) => i64::try_from(cap).unwrap_or(i64::MAX),
        }
    }
}

/// Per-period unit caps. Raw integers as the plan catalog stores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Generic monthly token cap, used when no task-specific cap is set.
    pub monthly_token_limit: i64,
    pub chat_token_limit: Option<i64>,
    pub embedding_token_limit: Option<i64>,
    pub monthly_image_credits: i64,
    pub monthly_video_minutes: i64,
    pub daily_request_limit: i64,
}

impl Plan {
    /// A plan with every cap unlimited.
    pub fn unlimited(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            monthly_token_limit: -1,
            chat_token_limit: None,
            embedding_token_limit: None,
            monthly_image_credits: -1,
            monthly_video_minutes: -1,
            daily_request_limit: -1,
        }
    }

    pub fn effective_chat_token_limit(&self) -> Limit {
        Limit::from_raw(self.chat_token_limit.unwrap_or(self.monthly_token_limit))
    }

    pub fn effective_embedding_token_limit(&self) -> Limit {
        Limit::from_raw(self.embedding_token_limit.unwrap_or(self.monthly_token_limit))
    }

    pub fn daily_requests(&self) -> Limit {
        Limit::from_raw(self.daily_request_limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Expired => "expired",
        }
    }

    pub fn admits_usage(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }
}

/// The window quotas accumulate over. Counters are keyed by `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BillingPeriod {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Half-open: `start` is inside, `end` is not.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user_id: UserId,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub period: BillingPeriod,
    /// Balance as of when this record was read. Admission asks the
    /// [`CreditLedger`](super::store::CreditLedger) for the live figure.
    pub credit_balance_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionWithPlan {
    pub subscription: Subscription,
    pub plan: Plan,
}
