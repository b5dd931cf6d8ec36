//! In-memory balance repository used by the engine tests.
//!
//! Semantics mirror the MySQL adapter: one writer at a time (the owned
//! mutex guard held for the life of the transaction), writes staged until
//! commit, and a transaction dropped without committing changes nothing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::ledger::error::LedgerError;
use crate::ledger::store::{BucketState, BucketWrite, LedgerRepo, LedgerTx, NewLeaveRequest};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::leave_type::LeaveType;

#[derive(Default)]
struct MemoryState {
    leave_types: HashMap<u64, LeaveType>,
    buckets: HashMap<(u64, u64, NaiveDate), i64>,
    requests: HashMap<u64, LeaveRequest>,
    last_request_id: u64,
}

#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_leave_type(&self, leave_type: LeaveType) {
        let mut state = self.state.lock().await;
        state.leave_types.insert(leave_type.id, leave_type);
    }

    pub async fn bucket(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        period_start: NaiveDate,
    ) -> Option<i64> {
        let state = self.state.lock().await;
        state
            .buckets
            .get(&(employee_id, leave_type_id, period_start))
            .copied()
    }

    pub async fn set_bucket(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        period_start: NaiveDate,
        balance: i64,
    ) {
        let mut state = self.state.lock().await;
        state
            .buckets
            .insert((employee_id, leave_type_id, period_start), balance);
    }

    /// Deletes a bucket row out from under the ledger, simulating the
    /// consistency fault the restore path must surface.
    pub async fn remove_bucket(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        period_start: NaiveDate,
    ) {
        let mut state = self.state.lock().await;
        state
            .buckets
            .remove(&(employee_id, leave_type_id, period_start));
    }

    pub async fn bucket_count(&self) -> usize {
        self.state.lock().await.buckets.len()
    }

    pub async fn request(&self, id: u64) -> Option<LeaveRequest> {
        self.state.lock().await.requests.get(&id).cloned()
    }
}

impl LedgerRepo for MemoryLedger {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx, LedgerError> {
        let guard = self.state.clone().lock_owned().await;
        Ok(MemoryTx {
            guard,
            staged_buckets: Vec::new(),
            staged_requests: Vec::new(),
            staged_statuses: Vec::new(),
        })
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged_buckets: Vec<((u64, u64, NaiveDate), i64)>,
    staged_requests: Vec<LeaveRequest>,
    staged_statuses: Vec<(u64, LeaveStatus)>,
}

impl LedgerTx for MemoryTx {
    async fn leave_type(&mut self, id: u64) -> Result<Option<LeaveType>, LedgerError> {
        Ok(self.guard.leave_types.get(&id).cloned())
    }

    async fn lock_buckets(
        &mut self,
        employee_id: u64,
        leave_type_id: u64,
        period_starts: &[NaiveDate],
    ) -> Result<Vec<BucketState>, LedgerError> {
        let mut buckets = Vec::new();
        for &period_start in period_starts {
            if let Some(&balance) = self
                .guard
                .buckets
                .get(&(employee_id, leave_type_id, period_start))
            {
                buckets.push(BucketState {
                    period_start,
                    balance,
                });
            }
        }
        Ok(buckets)
    }

    async fn upsert_bucket(
        &mut self,
        employee_id: u64,
        leave_type_id: u64,
        write: BucketWrite,
    ) -> Result<(), LedgerError> {
        self.staged_buckets
            .push(((employee_id, leave_type_id, write.period_start), write.balance));
        Ok(())
    }

    async fn insert_request(&mut self, request: &NewLeaveRequest) -> Result<u64, LedgerError> {
        // Ids advance even if the transaction later rolls back, matching
        // auto-increment behavior.
        self.guard.last_request_id += 1;
        let id = self.guard.last_request_id;
        self.staged_requests.push(LeaveRequest {
            id,
            employee_id: request.employee_id,
            leave_type_id: request.leave_type_id,
            from_date: request.from_date,
            to_date: request.to_date,
            leave_days: request.leave_days,
            reason: request.reason.clone(),
            reviewer_id: request.reviewer_id,
            status: LeaveStatus::Pending,
            applied_on: Some(Utc::now()),
            window_splits: request.window_splits.clone(),
        });
        Ok(id)
    }

    async fn lock_request(&mut self, id: u64) -> Result<Option<LeaveRequest>, LedgerError> {
        Ok(self.guard.requests.get(&id).cloned())
    }

    async fn set_request_status(
        &mut self,
        id: u64,
        status: LeaveStatus,
    ) -> Result<(), LedgerError> {
        self.staged_statuses.push((id, status));
        Ok(())
    }

    async fn commit(mut self) -> Result<(), LedgerError> {
        for (key, balance) in self.staged_buckets.drain(..) {
            self.guard.buckets.insert(key, balance);
        }
        for request in self.staged_requests.drain(..) {
            self.guard.requests.insert(request.id, request);
        }
        for (id, status) in self.staged_statuses.drain(..) {
            if let Some(request) = self.guard.requests.get_mut(&id) {
                request.status = status;
            }
        }
        Ok(())
    }
}
