use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One employee's remaining days for one leave type in one renewal period.
/// Rows are materialized lazily: a period that has never been debited or
/// credited has no row and implicitly holds the leave type's full allowance.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = 1)]
    pub leave_type_id: u64,

    /// Start of the renewal period this bucket belongs to; together with
    /// employee and leave type it forms the bucket's natural key
    #[schema(example = "2026-03-01", format = "date", value_type = String)]
    pub period_start: NaiveDate,

    /// Days remaining in this bucket; never negative once committed
    #[schema(example = 1)]
    pub balance: i64,

    #[schema(example = "2026-03-02T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
