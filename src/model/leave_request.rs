use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum_macros::Display,
    strum_macros::EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Withdrawn,
}

impl LeaveStatus {
    /// Approved, rejected and withdrawn are all terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// Day count debited from one period bucket when a request was applied.
/// The full set is persisted on the request row so reject/withdraw replay
/// exactly what was committed, independent of later leave-type edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WindowSplit {
    #[schema(example = "2026-03-01", format = "date", value_type = String)]
    pub period_start: NaiveDate,

    #[schema(example = 2)]
    pub days: i64,
}

#[derive(Debug, Clone)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type_id: u64,

    /// Inclusive calendar range; immutable after creation
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,

    /// Total inclusive day count of the range
    pub leave_days: i64,

    pub reason: Option<String>,
    pub reviewer_id: u64,
    pub status: LeaveStatus,
    pub applied_on: Option<DateTime<Utc>>,

    /// Per-period debits committed at apply time
    pub window_splits: Vec<WindowSplit>,
}
