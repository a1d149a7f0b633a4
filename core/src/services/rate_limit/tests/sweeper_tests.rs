//! Expired generation event cleanup tests

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use super::mocks::FlakyDeleteStore;
use crate::domain::entities::{GEN_ROW_END, GEN_ROW_PREFIX, MAX_GENERATIONS, RATE_WINDOW_SECONDS};
use crate::domain::value_objects::SubjectKey;
use crate::repositories::{MemoryRowStore, RowRange, RowStore};
use crate::services::clock::ManualClock;
use crate::services::rate_limit::{EventSweeper, RateLimiter, SweepReport};

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    ))
}

fn window() -> Duration {
    Duration::seconds(RATE_WINDOW_SECONDS)
}

fn alice() -> SubjectKey {
    SubjectKey::parse("alice@example.com", "subject").unwrap()
}

async fn remaining_events(store: &dyn RowStore, subject: &SubjectKey) -> usize {
    store
        .scan(subject.as_str(), &RowRange::new(GEN_ROW_PREFIX, GEN_ROW_END), None)
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn test_sweeps_only_rows_outside_window() {
    let store = Arc::new(MemoryRowStore::new());
    let clock = clock();
    let limiter = RateLimiter::new(store.clone(), clock.clone(), MAX_GENERATIONS, window());
    let sweeper = EventSweeper::new(store.clone(), clock.clone(), window());
    let subject = alice();

    limiter.check_and_record(&subject).await.unwrap();
    limiter.check_and_record(&subject).await.unwrap();
    clock.advance(Duration::minutes(8));
    limiter.check_and_record(&subject).await.unwrap();
    clock.advance(Duration::minutes(3));

    let report = sweeper.sweep_expired_events(&subject).await;
    assert_eq!(
        report,
        SweepReport {
            scanned: 2,
            deleted: 2,
            failed: 0
        }
    );
    assert_eq!(remaining_events(store.as_ref(), &subject).await, 1);
}

#[tokio::test]
async fn test_sweep_leaves_current_record_alone() {
    let store = Arc::new(MemoryRowStore::new());
    let clock = clock();
    let sweeper = EventSweeper::new(store.clone(), clock.clone(), window());
    let subject = alice();

    store.upsert(subject.as_str(), "current", "{}").await.unwrap();
    clock.advance(Duration::days(1));

    let report = sweeper.sweep_expired_events(&subject).await;
    assert_eq!(report.scanned, 0);
    assert!(store.get(subject.as_str(), "current").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_failures_are_reported_not_raised() {
    let store = Arc::new(FlakyDeleteStore::failing());
    let clock = clock();
    let limiter = RateLimiter::new(store.clone(), clock.clone(), MAX_GENERATIONS, window());
    let sweeper = EventSweeper::new(store.clone(), clock.clone(), window());
    let subject = alice();

    limiter.check_and_record(&subject).await.unwrap();
    limiter.check_and_record(&subject).await.unwrap();
    clock.advance(Duration::minutes(11));

    let report = sweeper.sweep_expired_events(&subject).await;
    assert_eq!(report.scanned, 2);
    assert_eq!(report.deleted, 0);
    assert_eq!(report.failed, 2);
    assert!(!report.is_clean());
    assert_eq!(remaining_events(store.as_ref(), &subject).await, 2);
}

#[tokio::test]
async fn test_scan_failure_is_reported() {
    let store = Arc::new(MemoryRowStore::new());
    let sweeper = EventSweeper::new(store.clone(), clock(), window());
    store.set_unavailable(true);

    let report = sweeper.sweep_expired_events(&alice()).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.deleted, 0);
}

#[tokio::test]
async fn test_spawned_sweep_completes() {
    let store = Arc::new(MemoryRowStore::new());
    let clock = clock();
    let limiter = RateLimiter::new(store.clone(), clock.clone(), MAX_GENERATIONS, window());
    let sweeper = Arc::new(EventSweeper::new(store.clone(), clock.clone(), window()));
    let subject = alice();

    limiter.check_and_record(&subject).await.unwrap();
    clock.advance(Duration::minutes(11));

    let report = sweeper.spawn(subject.clone()).await.unwrap();
    assert_eq!(report.deleted, 1);
    assert_eq!(remaining_events(store.as_ref(), &subject).await, 0);
}
