//! Engine scenario tests over the in-memory repository.

use chrono::NaiveDate;

use crate::ledger::engine::{ApplyLeave, LedgerEngine};
use crate::ledger::error::LedgerError;
use crate::ledger::memory::MemoryLedger;
use crate::model::leave_request::LeaveStatus;
use crate::model::leave_type::{LeaveType, RenewPeriod};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Monthly-renewing type anchored at Jan 1 2026.
fn monthly_type(id: u64, days_allowed: i64) -> LeaveType {
    LeaveType {
        id,
        name: "Casual Leave".to_string(),
        days_allowed,
        renew_period: RenewPeriod::Month,
        renew_period_count: 1,
        carry_over: false,
        paid_leave: true,
        leave_encashment: false,
        anchor_date: date(2026, 1, 1),
        created_at: None,
    }
}

fn apply_cmd(employee_id: u64, leave_type_id: u64, from: NaiveDate, to: NaiveDate) -> ApplyLeave {
    ApplyLeave {
        employee_id,
        leave_type_id,
        from_date: from,
        to_date: to,
        reviewer_id: 900,
        reason: None,
    }
}

const EMP: u64 = 1000;
const TYPE: u64 = 1;
const MAR: (i32, u32, u32) = (2026, 3, 1);
const APR: (i32, u32, u32) = (2026, 4, 1);

async fn setup(days_allowed: i64) -> (MemoryLedger, LedgerEngine<MemoryLedger>) {
    let repo = MemoryLedger::new();
    repo.add_leave_type(monthly_type(TYPE, days_allowed)).await;
    let engine = LedgerEngine::new(repo.clone());
    (repo, engine)
}

#[tokio::test]
async fn single_day_apply_materializes_one_bucket() {
    let (repo, engine) = setup(2).await;

    let applied = engine
        .apply_leave(apply_cmd(EMP, TYPE, date(2026, 3, 10), date(2026, 3, 10)))
        .await
        .unwrap();

    assert_eq!(applied.leave_days, 1);
    assert_eq!(repo.bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2)).await, Some(1));
    assert_eq!(repo.bucket_count().await, 1);

    let request = repo.request(applied.request_id).await.unwrap();
    assert_eq!(request.status, LeaveStatus::Pending);
    assert_eq!(request.leave_days, 1);
    assert_eq!(request.window_splits.len(), 1);
    assert_eq!(request.window_splits[0].days, 1);
}

#[tokio::test]
async fn boundary_straddle_debits_both_buckets() {
    let (repo, engine) = setup(2).await;

    // Mar 30 - Apr 1: two days in March, one in April.
    let applied = engine
        .apply_leave(apply_cmd(EMP, TYPE, date(2026, 3, 30), date(2026, 4, 1)))
        .await
        .unwrap();

    assert_eq!(applied.leave_days, 3);
    assert_eq!(repo.bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2)).await, Some(0));
    assert_eq!(repo.bucket(EMP, TYPE, date(APR.0, APR.1, APR.2)).await, Some(1));
}

#[tokio::test]
async fn insufficient_month_is_named_and_nothing_is_touched() {
    let (repo, engine) = setup(2).await;
    repo.set_bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2), 0).await;

    let err = engine
        .apply_leave(apply_cmd(EMP, TYPE, date(2026, 3, 10), date(2026, 3, 10)))
        .await
        .unwrap_err();

    match err {
        LedgerError::InsufficientBalance { periods } => assert_eq!(periods, vec!["Mar"]),
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }
    assert_eq!(repo.bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2)).await, Some(0));
    assert_eq!(repo.bucket_count().await, 1);
}

#[tokio::test]
async fn multi_bucket_apply_is_all_or_nothing() {
    let (repo, engine) = setup(2).await;
    // April is already empty; the straddling request must leave March alone too.
    repo.set_bucket(EMP, TYPE, date(APR.0, APR.1, APR.2), 0).await;

    let err = engine
        .apply_leave(apply_cmd(EMP, TYPE, date(2026, 3, 30), date(2026, 4, 1)))
        .await
        .unwrap_err();

    match err {
        LedgerError::InsufficientBalance { periods } => assert_eq!(periods, vec!["Apr"]),
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }
    assert_eq!(repo.bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2)).await, None);
    assert_eq!(repo.bucket(EMP, TYPE, date(APR.0, APR.1, APR.2)).await, Some(0));
}

#[tokio::test]
async fn reject_restores_every_touched_bucket_exactly() {
    let (repo, engine) = setup(2).await;

    let applied = engine
        .apply_leave(apply_cmd(EMP, TYPE, date(2026, 3, 30), date(2026, 4, 1)))
        .await
        .unwrap();
    engine.reject_leave(applied.request_id).await.unwrap();

    assert_eq!(repo.bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2)).await, Some(2));
    assert_eq!(repo.bucket(EMP, TYPE, date(APR.0, APR.1, APR.2)).await, Some(2));
    let request = repo.request(applied.request_id).await.unwrap();
    assert_eq!(request.status, LeaveStatus::Rejected);
}

#[tokio::test]
async fn withdraw_restores_identically_to_reject() {
    let (repo, engine) = setup(2).await;

    let applied = engine
        .apply_leave(apply_cmd(EMP, TYPE, date(2026, 3, 30), date(2026, 4, 1)))
        .await
        .unwrap();
    engine.withdraw_leave(applied.request_id).await.unwrap();

    assert_eq!(repo.bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2)).await, Some(2));
    assert_eq!(repo.bucket(EMP, TYPE, date(APR.0, APR.1, APR.2)).await, Some(2));
    let request = repo.request(applied.request_id).await.unwrap();
    assert_eq!(request.status, LeaveStatus::Withdrawn);
}

#[tokio::test]
async fn double_release_restores_only_once() {
    let (repo, engine) = setup(2).await;

    let applied = engine
        .apply_leave(apply_cmd(EMP, TYPE, date(2026, 3, 10), date(2026, 3, 11)))
        .await
        .unwrap();
    engine.reject_leave(applied.request_id).await.unwrap();

    let err = engine.reject_leave(applied.request_id).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InvalidStateTransition {
            status: LeaveStatus::Rejected,
            ..
        }
    ));
    // A withdraw after the reject must not credit a second time either.
    let err = engine.withdraw_leave(applied.request_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidStateTransition { .. }));

    assert_eq!(repo.bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2)).await, Some(2));
}

#[tokio::test]
async fn approve_leaves_the_ledger_alone_and_is_terminal() {
    let (repo, engine) = setup(2).await;

    let applied = engine
        .apply_leave(apply_cmd(EMP, TYPE, date(2026, 3, 10), date(2026, 3, 10)))
        .await
        .unwrap();
    engine.approve_leave(applied.request_id).await.unwrap();

    // The debit happened at apply time; approval changes nothing.
    assert_eq!(repo.bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2)).await, Some(1));
    let request = repo.request(applied.request_id).await.unwrap();
    assert_eq!(request.status, LeaveStatus::Approved);

    let err = engine.reject_leave(applied.request_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidStateTransition { .. }));
    assert_eq!(repo.bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2)).await, Some(1));
}

#[tokio::test]
async fn restore_surfaces_a_missing_bucket_instead_of_skipping_it() {
    let (repo, engine) = setup(2).await;

    let applied = engine
        .apply_leave(apply_cmd(EMP, TYPE, date(2026, 3, 30), date(2026, 4, 1)))
        .await
        .unwrap();
    repo.remove_bucket(EMP, TYPE, date(APR.0, APR.1, APR.2)).await;

    let err = engine.reject_leave(applied.request_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::BucketMissing { .. }));

    // The failed restore must not have half-credited March or moved the status.
    assert_eq!(repo.bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2)).await, Some(0));
    let request = repo.request(applied.request_id).await.unwrap();
    assert_eq!(request.status, LeaveStatus::Pending);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (_repo, engine) = setup(2).await;

    let err = engine
        .apply_leave(apply_cmd(EMP, 42, date(2026, 3, 10), date(2026, 3, 10)))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::LeaveTypeNotFound(42)));

    let err = engine.approve_leave(7).await.unwrap_err();
    assert!(matches!(err, LedgerError::RequestNotFound(7)));
}

#[tokio::test]
async fn concurrent_applies_for_the_last_day_admit_exactly_one() {
    let (repo, engine) = setup(1).await;

    let first = engine.apply_leave(apply_cmd(EMP, TYPE, date(2026, 3, 10), date(2026, 3, 10)));
    let second = engine.apply_leave(apply_cmd(EMP, TYPE, date(2026, 3, 11), date(2026, 3, 11)));
    let (first, second) = futures::join!(first, second);

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let failure = if first.is_err() { first } else { second };
    assert!(matches!(
        failure.unwrap_err(),
        LedgerError::InsufficientBalance { .. }
    ));
    assert_eq!(repo.bucket(EMP, TYPE, date(MAR.0, MAR.1, MAR.2)).await, Some(0));
}
