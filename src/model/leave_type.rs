use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unit of the renewal rule: a leave type's allowance resets every
/// `renew_period_count` of these.
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
pub enum RenewPeriod {
    Month,
    Year,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Paid Leave",
        "days_allowed": 2,
        "renew_period": "month",
        "renew_period_count": 1,
        "carry_over": false,
        "paid_leave": true,
        "leave_encashment": false,
        "anchor_date": "2026-01-01",
        "created_at": "2026-01-01T00:00:00Z"
    })
)]
pub struct LeaveType {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Paid Leave")]
    pub name: String,

    /// Allowance granted per renewal period
    #[schema(example = 2)]
    pub days_allowed: i64,

    #[schema(example = "month")]
    pub renew_period: RenewPeriod,

    /// Periods span this many months/years
    #[schema(example = 1)]
    pub renew_period_count: u32,

    #[schema(example = false)]
    pub carry_over: bool,

    #[schema(example = true)]
    pub paid_leave: bool,

    /// Mutually exclusive with carry_over
    #[schema(example = false)]
    pub leave_encashment: bool,

    /// Date the very first renewal period starts from; all period
    /// boundaries are computed by calendar addition from this date
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub anchor_date: NaiveDate,

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
