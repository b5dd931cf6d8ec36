use crate::api::balance::BalanceQuery;
use crate::api::leave_request::{
    ApplyLeaveRequest, LeaveFilter, LeaveListResponse, LeaveResponse,
};
use crate::api::leave_type::CreateLeaveType;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{LeaveStatus, WindowSplit};
use crate::model::leave_type::{LeaveType, RenewPeriod};
use utoipa::OpenApi;
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Ledger API",
        version = "1.0.0",
        description = r#"
## Periodic Leave-Balance Ledger

This API tracks how many leave days an employee has left per leave type,
bucketed into renewing time periods, and keeps the ledger consistent as
requests are applied, approved, rejected or withdrawn.

### 🔹 Key Features
- **Leave Types**
  - Configure allowance and renewal rule (every N months or years)
- **Leave Applications**
  - Apply for leave across period boundaries; every touched period is
    validated before any balance is debited
- **Review Workflow**
  - Approve (no ledger effect), reject or withdraw (balance restored
    exactly once)
- **Balances**
  - Inspect the materialized per-period buckets

### 📦 Response Format
- JSON-based RESTful responses
- Apply/review operations return `{"status": "SUCCESS" | "FAILED", ...}`;
  failed applications name the periods with insufficient balance

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::apply_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::withdraw_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_list,

        crate::api::leave_type::create_leave_type,
        crate::api::leave_type::get_leave_type,
        crate::api::leave_type::leave_type_list,

        crate::api::balance::list_balances
    ),
    components(
        schemas(
            ApplyLeaveRequest,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            LeaveStatus,
            WindowSplit,
            CreateLeaveType,
            LeaveType,
            RenewPeriod,
            BalanceQuery,
            LeaveBalance
        )
    ),
    tags(
        (name = "Leave", description = "Leave application and review APIs"),
        (name = "LeaveType", description = "Leave type configuration APIs"),
        (name = "Balance", description = "Balance bucket inspection APIs"),
    )
)]
pub struct ApiDoc;
