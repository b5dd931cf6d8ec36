use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::model::leave_type::{LeaveType, RenewPeriod};
use crate::utils::leave_type_cache;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeaveType {
    #[schema(example = "Paid Leave")]
    pub name: String,
    #[schema(example = 2)]
    pub days_allowed: i64,
    #[schema(example = "month")]
    pub renew_period: RenewPeriod,
    #[schema(example = 1)]
    pub renew_period_count: u32,
    #[schema(example = false)]
    pub carry_over: bool,
    #[schema(example = true)]
    pub paid_leave: bool,
    #[schema(example = false)]
    pub leave_encashment: bool,
    /// First period start; defaults to the creation date when omitted
    #[schema(example = "2026-01-01", format = "date", value_type = String, nullable = true)]
    pub anchor_date: Option<NaiveDate>,
}

const LEAVE_TYPE_COLUMNS: &str = r#"
    id, name, days_allowed, renew_period, renew_period_count,
    carry_over, paid_leave, leave_encashment, anchor_date, created_at
"#;

/* =========================
Create leave type
========================= */
/// Swagger doc for create_leave_type endpoint
#[utoipa::path(
    post,
    path = "/api/v1/leave-type",
    request_body(
        content = CreateLeaveType,
        description = "Leave type configuration; immutable after creation",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave type created", body = Object, example = json!({
            "message": "Leave type created",
            "id": 1
        })),
        (status = 400, description = "Invalid renewal configuration", body = Object, example = json!({
            "message": "renew_period_count must be at least 1"
        }))
    ),
    tag = "LeaveType"
)]
pub async fn create_leave_type(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeaveType>,
) -> actix_web::Result<impl Responder> {
    // 1️⃣ validate the renewal rule before it becomes engine input
    if payload.days_allowed < 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "days_allowed cannot be negative"
        })));
    }
    if payload.renew_period_count < 1 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "renew_period_count must be at least 1"
        })));
    }
    if payload.carry_over && payload.leave_encashment {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "carry_over and leave_encashment cannot both be enabled"
        })));
    }

    let anchor_date = payload
        .anchor_date
        .unwrap_or_else(|| Utc::now().date_naive());

    // 2️⃣ insert configuration
    let result = sqlx::query(
        r#"
        INSERT INTO leave_types
            (name, days_allowed, renew_period, renew_period_count,
             carry_over, paid_leave, leave_encashment, anchor_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(payload.days_allowed)
    .bind(payload.renew_period)
    .bind(payload.renew_period_count)
    .bind(payload.carry_over)
    .bind(payload.paid_leave)
    .bind(payload.leave_encashment)
    .bind(anchor_date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to create leave type");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let id = result.last_insert_id();

    // 3️⃣ warm the cache with the fresh row
    let sql = format!("SELECT {} FROM leave_types WHERE id = ?", LEAVE_TYPE_COLUMNS);
    if let Ok(Some(leave_type)) = sqlx::query_as::<_, LeaveType>(&sql)
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
    {
        leave_type_cache::insert(leave_type).await;
    }

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Leave type created",
        "id": id
    })))
}

/// for getting a leave type details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave-type/{leave_type_id}",
    params(
        ("leave_type_id" = u64, Path, description = "ID of the leave type to fetch")
    ),
    responses(
        (status = 200, description = "Leave type found", body = LeaveType),
        (status = 404, description = "Leave type not found", body = Object, example = json!({
            "message": "Leave type not found"
        }))
    ),
    tag = "LeaveType"
)]
pub async fn get_leave_type(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_type_id = path.into_inner();

    if let Some(leave_type) = leave_type_cache::get(leave_type_id).await {
        return Ok(HttpResponse::Ok().json(leave_type));
    }

    let sql = format!("SELECT {} FROM leave_types WHERE id = ?", LEAVE_TYPE_COLUMNS);
    let leave_type = sqlx::query_as::<_, LeaveType>(&sql)
        .bind(leave_type_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_type_id, "Failed to fetch leave type");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match leave_type {
        Some(leave_type) => {
            leave_type_cache::insert(leave_type.clone()).await;
            Ok(HttpResponse::Ok().json(leave_type))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave type not found"
        }))),
    }
}

/// for getting configured leave types endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave-type",
    responses(
        (status = 200, description = "Configured leave types", body = Object, example = json!({
            "data": [
                {
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
                }
            ]
        }))
    ),
    tag = "LeaveType"
)]
pub async fn leave_type_list(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let sql = format!("SELECT {} FROM leave_types ORDER BY id", LEAVE_TYPE_COLUMNS);
    let leave_types = sqlx::query_as::<_, LeaveType>(&sql)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave types");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": leave_types })))
}
