//! Balance repository contract.
//!
//! The engine speaks to storage through a unit-of-work pair of traits so
//! the same orchestration runs against MySQL in the server and against an
//! in-memory store in tests. Implementations must make `commit` atomic
//! across everything written through the transaction, and must roll back
//! when the transaction is dropped without committing.

use chrono::NaiveDate;

use crate::ledger::error::LedgerError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, WindowSplit};
use crate::model::leave_type::LeaveType;

/// A materialized bucket as the engine sees it inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketState {
    pub period_start: NaiveDate,
    pub balance: i64,
}

/// A bucket value to persist. The upsert materializes the row on first
/// touch and overwrites the balance on every later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketWrite {
    pub period_start: NaiveDate,
    pub balance: i64,
}

/// Leave request to insert alongside a successful debit.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub leave_days: i64,
    pub reason: Option<String>,
    pub reviewer_id: u64,
    pub window_splits: Vec<WindowSplit>,
}

#[allow(async_fn_in_trait)]
pub trait LedgerRepo {
    type Tx: LedgerTx;

    /// Opens a unit of work covering one apply/approve/reject/withdraw.
    async fn begin(&self) -> Result<Self::Tx, LedgerError>;
}

#[allow(async_fn_in_trait)]
pub trait LedgerTx: Sized {
    async fn leave_type(&mut self, id: u64) -> Result<Option<LeaveType>, LedgerError>;

    /// Reads the materialized buckets for the given period starts, locking
    /// them against concurrent writers for the rest of the transaction.
    /// Periods with no row yet are simply absent from the result.
    async fn lock_buckets(
        &mut self,
        employee_id: u64,
        leave_type_id: u64,
        period_starts: &[NaiveDate],
    ) -> Result<Vec<BucketState>, LedgerError>;

    async fn upsert_bucket(
        &mut self,
        employee_id: u64,
        leave_type_id: u64,
        write: BucketWrite,
    ) -> Result<(), LedgerError>;

    /// Inserts a pending request and returns its id.
    async fn insert_request(&mut self, request: &NewLeaveRequest) -> Result<u64, LedgerError>;

    /// Reads a request, locking it so a concurrent transition on the same
    /// request serializes behind this transaction.
    async fn lock_request(&mut self, id: u64) -> Result<Option<LeaveRequest>, LedgerError>;

    async fn set_request_status(&mut self, id: u64, status: LeaveStatus)
    -> Result<(), LedgerError>;

    async fn commit(self) -> Result<(), LedgerError>;
}
