//! Overage arithmetic. Money leaves this module as integer cents.

use super::plan::Limit;
use crate::config::DEFAULT_CENTS_ROUNDING_EPSILON;

/// Units of `[used_before, used_after]` that lie above `limit`.
///
/// `max(0, after - limit) - max(0, before - limit)`; always 0 when unlimited.
pub fn overage_units(used_before: u64, used_after: u64, limit: Limit) -> u64 {
    match limit {
        Limit::Unlimited => 0,
        Limit::Capped(cap) => used_after
            .saturating_sub(cap)
            .saturating_sub(used_before.saturating_sub(cap)),
    }
}

/// Charge for the overage share of an operation, rounded up to whole cents.
pub fn estimate_overage_cents(total_units: u64, total_cost_usd: f64, overage_units: u64) -> u64 {
    estimate_overage_cents_with(
        total_units,
        total_cost_usd,
        overage_units,
        DEFAULT_CENTS_ROUNDING_EPSILON,
    )
}

/// As [`estimate_overage_cents`], with an explicit rounding epsilon.
///
/// `epsilon` is subtracted before rounding up so representation error such as
/// 7.000000000000001 does not bill an extra cent.
pub fn estimate_overage_cents_with(
    total_units: u64,
    total_cost_usd: f64,
    overage_units: u64,
    epsilon: f64,
) -> u64 {
    if overage_units == 0 || total_units == 0 || !total_cost_usd.is_finite() || total_cost_usd <= 0.0 {
        return 0;
    }
    let share = overage_units.min(total_units) as f64 / total_units as f64;
    let cents = total_cost_usd * share * 100.0;
    (cents - epsilon).ceil().max(0.0) as u64
}

pub fn cents_to_usd(cents: u64) -> f64 {
    cents as f64 / 100.0
}
