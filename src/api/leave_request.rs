use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::{IntoParams, ToSchema};

use crate::ledger::engine::{ApplyLeave, LedgerEngine};
use crate::ledger::error::LedgerError;
use crate::ledger::mysql::MySqlLedger;
use crate::model::leave_request::LeaveStatus;

/// Engine flavor the HTTP surface runs against.
pub type Engine = LedgerEngine<MySqlLedger>;

#[derive(Deserialize, ToSchema)]
pub struct ApplyLeaveRequest {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = "2026-03-30", format = "date", value_type = String)]
    pub from_date: chrono::NaiveDate,
    #[schema(example = "2026-04-01", format = "date", value_type = String)]
    pub to_date: chrono::NaiveDate,
    #[schema(example = 900)]
    pub reviewer_id: u64,
    #[schema(example = "Family trip", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1)]
    /// leave application id
    pub id: u64,
    /// employee id for whom the leave is applied
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = "2026-03-30", format = "date", value_type = String)]
    /// leave start date
    pub from_date: chrono::NaiveDate,
    #[schema(example = "2026-04-01", format = "date", value_type = String)]
    /// leave end date (inclusive)
    pub to_date: chrono::NaiveDate,
    #[schema(example = 3)]
    /// total days debited across renewal periods
    pub leave_days: i64,
    #[schema(example = "Family trip", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = 900)]
    pub reviewer_id: u64,
    #[schema(example = "pending")]
    pub status: LeaveStatus,
    #[schema(example = "2026-03-01T00:00:00Z", format = "date-time", value_type = String)]
    pub applied_on: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "data": [
        {
            "id": 1,
            "employee_id": 1000,
            "leave_type_id": 1,
            "from_date": "2026-03-30",
            "to_date": "2026-04-01",
            "leave_days": 3,
            "reason": "Family trip",
            "reviewer_id": 900,
            "status": "pending",
            "applied_on": "2026-03-01T00:00:00Z"
        }
    ],
    "page": 1,
    "per_page": 10,
    "total": 1
}))]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 1000)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = 1)]
    /// Filter by leave type ID
    pub leave_type_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>, // items per page
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/// Builds the FAILED response for a ledger error. Insufficient-balance and
/// transition errors carry their own user-facing message; storage and
/// consistency faults get logged and surface a generic retryable one.
fn ledger_failure(err: LedgerError) -> HttpResponse {
    let code = err.status_code();
    if code >= 500 {
        tracing::error!(error = %err, "Ledger operation failed");
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "status": "FAILED",
            "message": "Internal error, please retry"
        }));
    }
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    HttpResponse::build(status).json(serde_json::json!({
        "status": "FAILED",
        "message": err.to_string()
    }))
}

/* =========================
Apply for leave
========================= */
/// Swagger doc for apply_leave endpoint
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = ApplyLeaveRequest,
        description = "Leave application payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave applied and balance debited",
         body = Object,
         example = json!({
            "status": "SUCCESS",
            "request_id": 1,
            "leave_days": 3
         })
        ),
        (status = 400, description = "Invalid dates or not enough balance", body = Object, example = json!({
            "status": "FAILED",
            "message": "Not enough leave balance for Mar, Apr"
        })),
        (status = 404, description = "Leave type not found")
    ),
    tag = "Leave"
)]
pub async fn apply_leave(
    engine: web::Data<Engine>,
    payload: web::Json<ApplyLeaveRequest>,
) -> actix_web::Result<impl Responder> {
    // validate dates before touching the ledger
    if payload.from_date > payload.to_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "status": "FAILED",
            "message": "from_date cannot be after to_date"
        })));
    }

    let payload = payload.into_inner();
    let command = ApplyLeave {
        employee_id: payload.employee_id,
        leave_type_id: payload.leave_type_id,
        from_date: payload.from_date,
        to_date: payload.to_date,
        reviewer_id: payload.reviewer_id,
        reason: payload.reason,
    };

    match engine.apply_leave(command).await {
        Ok(applied) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "status": "SUCCESS",
            "request_id": applied.request_id,
            "leave_days": applied.leave_days
        }))),
        Err(err) => Ok(ledger_failure(err)),
    }
}

/* =========================
Approve leave (reviewer)
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = Object, example = json!({
            "status": "SUCCESS",
            "message": "Leave approved"
        })),
        (status = 400, description = "Request already processed", body = Object, example = json!({
            "status": "FAILED",
            "message": "Leave request 1 is already rejected"
        })),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    engine: web::Data<Engine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    match engine.approve_leave(leave_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "status": "SUCCESS",
            "message": "Leave approved"
        }))),
        Err(err) => Ok(ledger_failure(err)),
    }
}

/* =========================
Reject leave (reviewer)
========================= */
/// Swagger doc for reject_leave endpoint
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected and balance restored", body = Object, example = json!({
            "status": "SUCCESS",
            "message": "Leave rejected"
        })),
        (status = 400, description = "Request already processed"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    engine: web::Data<Engine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    match engine.reject_leave(leave_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "status": "SUCCESS",
            "message": "Leave rejected"
        }))),
        Err(err) => Ok(ledger_failure(err)),
    }
}

/* =========================
Withdraw leave (employee)
========================= */
/// Swagger doc for withdraw_leave endpoint
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/withdraw",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to withdraw")
    ),
    responses(
        (status = 200, description = "Leave withdrawn and balance restored", body = Object, example = json!({
            "status": "SUCCESS",
            "message": "Leave withdrawn"
        })),
        (status = 400, description = "Request already processed"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn withdraw_leave(
    engine: web::Data<Engine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    match engine.withdraw_leave(leave_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "status": "SUCCESS",
            "message": "Leave withdrawn"
        }))),
        Err(err) => Ok(ledger_failure(err)),
    }
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveResponse>(
        r#"
        SELECT
            id,
            employee_id,
            leave_type_id,
            from_date,
            to_date,
            leave_days,
            reason,
            reviewer_id,
            status,
            applied_on
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match leave {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse)
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(leave_type_id) = query.leave_type_id {
        where_sql.push_str(" AND leave_type_id = ?");
        args.push(FilterValue::U64(leave_type_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error=%e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT id, employee_id, leave_type_id, from_date, to_date, leave_days,
               reason, reviewer_id, status, applied_on
        FROM leave_requests
        {}
        ORDER BY applied_on DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveResponse>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error=%e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    // -------------------------
    // Response
    // -------------------------
    let response = LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
