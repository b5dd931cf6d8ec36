//! The ledger engine: multi-bucket debit on apply, multi-bucket credit on
//! reject/withdraw, and the leave-request status transitions around them.
//!
//! Every operation runs inside one repository transaction. Apply validates
//! all touched buckets before mutating any of them; restore replays the
//! split stored on the request at apply time rather than recomputing it,
//! so a renewal rule edited after the fact cannot desynchronize the credit
//! from the original debit.

use chrono::NaiveDate;

use crate::ledger::error::LedgerError;
use crate::ledger::period::{WindowDays, period_label, period_windows, split_days};
use crate::ledger::store::{BucketState, BucketWrite, LedgerRepo, LedgerTx, NewLeaveRequest};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, WindowSplit};
use crate::model::leave_type::LeaveType;

/// Apply command as received from the API surface.
#[derive(Debug, Clone)]
pub struct ApplyLeave {
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reviewer_id: u64,
    pub reason: Option<String>,
}

/// Result of a committed apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedLeave {
    pub request_id: u64,
    pub leave_days: i64,
}

#[derive(Clone)]
pub struct LedgerEngine<R> {
    repo: R,
}

impl<R: LedgerRepo> LedgerEngine<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Debits every renewal period the requested range touches and creates
    /// the pending request, all in one transaction. Fails without mutating
    /// anything if any touched period would go negative.
    pub async fn apply_leave(&self, cmd: ApplyLeave) -> Result<AppliedLeave, LedgerError> {
        let mut tx = self.repo.begin().await?;

        let leave_type = tx
            .leave_type(cmd.leave_type_id)
            .await?
            .ok_or(LedgerError::LeaveTypeNotFound(cmd.leave_type_id))?;

        let windows = period_windows(
            leave_type.renew_period,
            leave_type.renew_period_count,
            leave_type.anchor_date,
            cmd.from_date,
            cmd.to_date,
        )?;
        let splits = split_days(&windows, cmd.from_date, cmd.to_date);

        let starts: Vec<NaiveDate> = splits.iter().map(|s| s.window.start).collect();
        let buckets = tx
            .lock_buckets(cmd.employee_id, cmd.leave_type_id, &starts)
            .await?;

        let writes = plan_debits(&leave_type, &splits, &buckets)?;
        for write in &writes {
            tx.upsert_bucket(cmd.employee_id, cmd.leave_type_id, *write)
                .await?;
        }

        let leave_days: i64 = splits.iter().map(|s| s.days).sum();
        let request = NewLeaveRequest {
            employee_id: cmd.employee_id,
            leave_type_id: cmd.leave_type_id,
            from_date: cmd.from_date,
            to_date: cmd.to_date,
            leave_days,
            reason: cmd.reason,
            reviewer_id: cmd.reviewer_id,
            window_splits: splits
                .iter()
                .map(|s| WindowSplit {
                    period_start: s.window.start,
                    days: s.days,
                })
                .collect(),
        };
        let request_id = tx.insert_request(&request).await?;
        tx.commit().await?;

        tracing::info!(
            request_id,
            employee_id = cmd.employee_id,
            leave_type_id = cmd.leave_type_id,
            leave_days,
            "Leave applied"
        );
        Ok(AppliedLeave {
            request_id,
            leave_days,
        })
    }

    /// Administrative acknowledgement only; the debit already happened at
    /// apply time, so approval never touches the ledger.
    pub async fn approve_leave(&self, request_id: u64) -> Result<(), LedgerError> {
        let mut tx = self.repo.begin().await?;
        let request = tx
            .lock_request(request_id)
            .await?
            .ok_or(LedgerError::RequestNotFound(request_id))?;
        ensure_pending(&request)?;
        tx.set_request_status(request_id, LeaveStatus::Approved)
            .await?;
        tx.commit().await
    }

    pub async fn reject_leave(&self, request_id: u64) -> Result<(), LedgerError> {
        self.release(request_id, LeaveStatus::Rejected).await
    }

    /// Withdrawal restores balance exactly like rejection.
    pub async fn withdraw_leave(&self, request_id: u64) -> Result<(), LedgerError> {
        self.release(request_id, LeaveStatus::Withdrawn).await
    }

    /// Credits every bucket the request debited and moves it to `target`.
    /// The pending-state lock doubles as the idempotency guard: a request
    /// can only be released once.
    async fn release(&self, request_id: u64, target: LeaveStatus) -> Result<(), LedgerError> {
        let mut tx = self.repo.begin().await?;
        let request = tx
            .lock_request(request_id)
            .await?
            .ok_or(LedgerError::RequestNotFound(request_id))?;
        ensure_pending(&request)?;

        let starts: Vec<NaiveDate> = request
            .window_splits
            .iter()
            .map(|s| s.period_start)
            .collect();
        let buckets = tx
            .lock_buckets(request.employee_id, request.leave_type_id, &starts)
            .await?;

        let writes = match plan_credits(&request, &buckets) {
            Ok(writes) => writes,
            Err(err) => {
                tracing::error!(
                    request_id,
                    employee_id = request.employee_id,
                    leave_type_id = request.leave_type_id,
                    error = %err,
                    "Leave restore hit an inconsistent balance bucket"
                );
                return Err(err);
            }
        };
        for write in &writes {
            tx.upsert_bucket(request.employee_id, request.leave_type_id, *write)
                .await?;
        }
        tx.set_request_status(request_id, target).await?;
        tx.commit().await?;

        tracing::info!(request_id, status = %target, "Leave released and balance restored");
        Ok(())
    }
}

fn ensure_pending(request: &LeaveRequest) -> Result<(), LedgerError> {
    if request.status.is_terminal() {
        return Err(LedgerError::InvalidStateTransition {
            id: request.id,
            status: request.status,
        });
    }
    Ok(())
}

/// Computes the post-debit balance of every touched bucket, treating
/// never-materialized buckets as holding the full allowance. Collects all
/// insufficient periods before failing so the caller can name each one.
fn plan_debits(
    leave_type: &LeaveType,
    splits: &[WindowDays],
    buckets: &[BucketState],
) -> Result<Vec<BucketWrite>, LedgerError> {
    let mut writes = Vec::with_capacity(splits.len());
    let mut short = Vec::new();
    for split in splits {
        let current = buckets
            .iter()
            .find(|b| b.period_start == split.window.start)
            .map(|b| b.balance)
            .unwrap_or(leave_type.days_allowed);
        let balance = current - split.days;
        if balance < 0 {
            short.push(period_label(leave_type.renew_period, split.window.start));
        }
        writes.push(BucketWrite {
            period_start: split.window.start,
            balance,
        });
    }
    if !short.is_empty() {
        return Err(LedgerError::InsufficientBalance { periods: short });
    }
    Ok(writes)
}

/// Credits each stored split back onto its bucket. Credit cannot be
/// insufficient, but every bucket must still exist: apply materialized
/// them, and skipping an absent one would under-restore the balance.
fn plan_credits(
    request: &LeaveRequest,
    buckets: &[BucketState],
) -> Result<Vec<BucketWrite>, LedgerError> {
    let mut writes = Vec::with_capacity(request.window_splits.len());
    for split in &request.window_splits {
        let Some(bucket) = buckets.iter().find(|b| b.period_start == split.period_start) else {
            return Err(LedgerError::BucketMissing {
                employee_id: request.employee_id,
                leave_type_id: request.leave_type_id,
                period_start: split.period_start,
            });
        };
        writes.push(BucketWrite {
            period_start: split.period_start,
            balance: bucket.balance + split.days,
        });
    }
    Ok(writes)
}
