use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::model::leave_balance::LeaveBalance;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct BalanceQuery {
    #[schema(example = 1000)]
    /// Employee whose buckets to list
    pub employee_id: u64,
    #[schema(example = 1)]
    /// Optionally narrow to one leave type
    pub leave_type_id: Option<u64>,
}

/// for getting an employee's materialized balance buckets endpoint
#[utoipa::path(
    get,
    path = "/api/v1/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Materialized balance buckets", body = Object, example = json!({
            "data": [
                {
                    "id": 1,
                    "employee_id": 1000,
                    "leave_type_id": 1,
                    "period_start": "2026-03-01",
                    "balance": 1,
                    "created_at": "2026-03-02T00:00:00Z"
                }
            ]
        }))
    ),
    tag = "Balance"
)]
pub async fn list_balances(
    pool: web::Data<MySqlPool>,
    query: web::Query<BalanceQuery>,
) -> actix_web::Result<impl Responder> {
    // Periods never debited or credited have no row; they implicitly hold
    // the leave type's full allowance.
    let mut sql = String::from(
        r#"
        SELECT id, employee_id, leave_type_id, period_start, balance, created_at
        FROM leave_balances
        WHERE employee_id = ?
        "#,
    );
    if query.leave_type_id.is_some() {
        sql.push_str(" AND leave_type_id = ?");
    }
    sql.push_str(" ORDER BY leave_type_id, period_start");

    let mut data_q = sqlx::query_as::<_, LeaveBalance>(&sql).bind(query.employee_id);
    if let Some(leave_type_id) = query.leave_type_id {
        data_q = data_q.bind(leave_type_id);
    }

    let balances = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, employee_id = query.employee_id, "Failed to fetch balances");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": balances })))
}
