//! MySQL-backed balance repository.
//!
//! One sqlx transaction per engine operation. `SELECT ... FOR UPDATE` on
//! the touched bucket rows serializes concurrent writers over the same
//! `(employee, leave type)` pair: two overlapping applies both try to lock
//! the same rows (or the same gap in the unique bucket index), so the
//! second one re-reads balances the first one already committed and the
//! read-validate-write sequence cannot lose updates.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{MySql, MySqlPool, Transaction};

use crate::ledger::error::LedgerError;
use crate::ledger::store::{BucketState, BucketWrite, LedgerRepo, LedgerTx, NewLeaveRequest};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::leave_type::LeaveType;
use crate::utils::leave_type_cache;

#[derive(Clone)]
pub struct MySqlLedger {
    pool: MySqlPool,
}

impl MySqlLedger {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl LedgerRepo for MySqlLedger {
    type Tx = MySqlLedgerTx;

    async fn begin(&self) -> Result<Self::Tx, LedgerError> {
        let tx = self.pool.begin().await.map_err(storage)?;
        Ok(MySqlLedgerTx { tx })
    }
}

/// Dropping without commit rolls the sqlx transaction back.
pub struct MySqlLedgerTx {
    tx: Transaction<'static, MySql>,
}

fn storage(err: sqlx::Error) -> LedgerError {
    LedgerError::Storage(err.to_string())
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: u64,
    employee_id: u64,
    leave_type_id: u64,
    from_date: NaiveDate,
    to_date: NaiveDate,
    leave_days: i64,
    reason: Option<String>,
    reviewer_id: u64,
    status: LeaveStatus,
    applied_on: Option<DateTime<Utc>>,
    window_splits: String,
}

impl LedgerTx for MySqlLedgerTx {
    async fn leave_type(&mut self, id: u64) -> Result<Option<LeaveType>, LedgerError> {
        // Leave types are immutable after creation, so the cache cannot go
        // stale even inside a transaction.
        if let Some(leave_type) = leave_type_cache::get(id).await {
            return Ok(Some(leave_type));
        }
        let row = sqlx::query_as::<_, LeaveType>(
            r#"
            SELECT id, name, days_allowed, renew_period, renew_period_count,
                   carry_over, paid_leave, leave_encashment, anchor_date, created_at
            FROM leave_types
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(storage)?;
        if let Some(leave_type) = &row {
            leave_type_cache::insert(leave_type.clone()).await;
        }
        Ok(row)
    }

    async fn lock_buckets(
        &mut self,
        employee_id: u64,
        leave_type_id: u64,
        period_starts: &[NaiveDate],
    ) -> Result<Vec<BucketState>, LedgerError> {
        if period_starts.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; period_starts.len()].join(", ");
        let sql = format!(
            r#"
            SELECT period_start, balance
            FROM leave_balances
            WHERE employee_id = ? AND leave_type_id = ? AND period_start IN ({})
            FOR UPDATE
            "#,
            placeholders
        );

        let mut query = sqlx::query_as::<_, (NaiveDate, i64)>(&sql)
            .bind(employee_id)
            .bind(leave_type_id);
        for start in period_starts {
            query = query.bind(*start);
        }

        let rows = query.fetch_all(&mut *self.tx).await.map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(|(period_start, balance)| BucketState {
                period_start,
                balance,
            })
            .collect())
    }

    async fn upsert_bucket(
        &mut self,
        employee_id: u64,
        leave_type_id: u64,
        write: BucketWrite,
    ) -> Result<(), LedgerError> {
        // Single idempotent primitive instead of an exists/insert/update
        // branch; the unique (employee_id, leave_type_id, period_start)
        // key makes first-touch materialization race-safe.
        sqlx::query(
            r#"
            INSERT INTO leave_balances (employee_id, leave_type_id, period_start, balance)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE balance = VALUES(balance)
            "#,
        )
        .bind(employee_id)
        .bind(leave_type_id)
        .bind(write.period_start)
        .bind(write.balance)
        .execute(&mut *self.tx)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn insert_request(&mut self, request: &NewLeaveRequest) -> Result<u64, LedgerError> {
        let window_splits = serde_json::to_string(&request.window_splits)
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, leave_type_id, from_date, to_date, leave_days,
                 reason, reviewer_id, status, window_splits)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.employee_id)
        .bind(request.leave_type_id)
        .bind(request.from_date)
        .bind(request.to_date)
        .bind(request.leave_days)
        .bind(request.reason.as_deref())
        .bind(request.reviewer_id)
        .bind(LeaveStatus::Pending)
        .bind(window_splits)
        .execute(&mut *self.tx)
        .await
        .map_err(storage)?;
        Ok(result.last_insert_id())
    }

    async fn lock_request(&mut self, id: u64) -> Result<Option<LeaveRequest>, LedgerError> {
        let row = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, employee_id, leave_type_id, from_date, to_date, leave_days,
                   reason, reviewer_id, status, applied_on, window_splits
            FROM leave_requests
            WHERE id = ?
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(storage)?;

        row.map(|r| {
            let window_splits = serde_json::from_str(&r.window_splits).map_err(|e| {
                LedgerError::Storage(format!("corrupt window split on request {}: {}", r.id, e))
            })?;
            Ok(LeaveRequest {
                id: r.id,
                employee_id: r.employee_id,
                leave_type_id: r.leave_type_id,
                from_date: r.from_date,
                to_date: r.to_date,
                leave_days: r.leave_days,
                reason: r.reason,
                reviewer_id: r.reviewer_id,
                status: r.status,
                applied_on: r.applied_on,
                window_splits,
            })
        })
        .transpose()
    }

    async fn set_request_status(
        &mut self,
        id: u64,
        status: LeaveStatus,
    ) -> Result<(), LedgerError> {
        sqlx::query("UPDATE leave_requests SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn commit(self) -> Result<(), LedgerError> {
        self.tx.commit().await.map_err(storage)
    }
}
