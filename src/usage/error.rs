use std::fmt;

use thiserror::Error;

use crate::types::TaskTypeError;

/// Failure reported by an external store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The fast counter has no value for this key. Reads fall back to the usage log.
    #[error("cache miss")]
    CacheMiss,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Which external collaborator a surfaced failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Subscriptions,
    Counters,
    UsageLog,
    CreditLedger,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Collaborator::Subscriptions => "subscription store",
            Collaborator::Counters => "quota counter store",
            Collaborator::UsageLog => "usage log",
            Collaborator::CreditLedger => "credit ledger",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UsageError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("daily request limit reached ({used}/{limit})")]
    RateLimitExceeded { used: u64, limit: u64 },

    #[error("insufficient credits: overage costs {required_cents} cents, {available_cents} available")]
    InsufficientCredits {
        required_cents: u64,
        available_cents: u64,
    },

    #[error("{collaborator} failed: {source}")]
    Store {
        collaborator: Collaborator,
        #[source]
        source: StoreError,
    },
}

impl UsageError {
    pub(crate) fn store(collaborator: Collaborator) -> impl FnOnce(StoreError) -> UsageError {
        move |source| UsageError::Store {
            collaborator,
            source,
        }
    }

    /// Quota-class refusals: no usable subscription or the daily ceiling.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(
            self,
            UsageError::QuotaExceeded(_) | UsageError::RateLimitExceeded { .. }
        )
    }
}

impl From<TaskTypeError> for UsageError {
    fn from(err: TaskTypeError) -> Self {
        UsageError::InvalidRequest(err.to_string())
    }
}
