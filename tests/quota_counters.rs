use std::sync::Arc;

use chrono::{TimeZone, Utc};
use relay_core::types::{TaskType, UserId};
use relay_core::usage::{
    BillingPeriod, Collaborator, FixedClock, MemoryCounterStore, MemoryUsageLog, QuotaCounters,
    UsageError,
};

fn period() -> BillingPeriod {
    BillingPeriod::new(
        Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap(),
    )
}

fn setup() -> (QuotaCounters, Arc<MemoryCounterStore>, Arc<MemoryUsageLog>) {
    let store = Arc::new(MemoryCounterStore::new());
    let log = Arc::new(MemoryUsageLog::new());
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap());
    let counters = QuotaCounters::new(store.clone(), log.clone()).with_clock(Arc::new(clock));
    (counters, store, log)
}

#[test]
fn cached_value_wins_over_log() {
    let (counters, store, log) = setup();
    let user = UserId::new("u");
    store.set_tokens(&user, period().start, 10);
    log.record(&user, TaskType::Chat, 999, period().start);

    assert_eq!(counters.units_used(&user, &period(), TaskType::Chat).unwrap(), 10);
}

#[test]
fn read_failure_of_any_kind_falls_back() {
    let (counters, store, log) = setup();
    let user = UserId::new("u");
    store.set_tokens(&user, period().start, 10);
    store.fail_reads(true);
    log.record(&user, TaskType::Embedding, 70, period().start);

    assert_eq!(counters.units_used(&user, &period(), TaskType::Chat).unwrap(), 70);
}

#[test]
fn media_counters_are_per_task() {
    let (counters, store, log) = setup();
    let user = UserId::new("u");
    store.set_media_units(&user, period().start, TaskType::Image, 4);
    log.record(&user, TaskType::Video, 12, period().start);

    assert_eq!(counters.units_used(&user, &period(), TaskType::Image).unwrap(), 4);
    assert_eq!(counters.units_used(&user, &period(), TaskType::Video).unwrap(), 12);
}

#[test]
fn log_failure_on_fallback_read_surfaces() {
    let (counters, _store, log) = setup();
    log.set_offline(true);

    let err = counters
        .units_used(&UserId::new("u"), &period(), TaskType::Chat)
        .unwrap_err();
    assert!(matches!(
        err,
        UsageError::Store {
            collaborator: Collaborator::UsageLog,
            ..
        }
    ));
}

#[test]
fn increment_returns_post_increment_total() {
    let (counters, store, _log) = setup();
    let user = UserId::new("u");
    store.set_tokens(&user, period().start, 100);

    assert_eq!(counters.increment(&user, &period(), TaskType::Chat, 5).unwrap(), 105);
    assert_eq!(counters.increment(&user, &period(), TaskType::Embedding, 5).unwrap(), 110);
}

#[test]
fn request_counter_increment_has_no_fallback() {
    let (counters, store, _log) = setup();
    store.fail_increments(true);
    let err = counters.increment_requests(&UserId::new("u")).unwrap_err();
    assert!(matches!(
        err,
        UsageError::Store {
            collaborator: Collaborator::Counters,
            ..
        }
    ));
}
