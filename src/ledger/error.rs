use chrono::NaiveDate;
use thiserror::Error;

use crate::model::leave_request::LeaveStatus;

/// Errors returned by the leave-balance ledger.
///
/// Every failure is a typed result; none of them leave a partially
/// applied mutation behind. Validation failures are reported before any
/// bucket is touched, and post-validation storage faults roll the whole
/// transaction back.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Unknown leave type.
    #[error("Leave type {0} not found")]
    LeaveTypeNotFound(u64),

    /// Unknown leave request.
    #[error("Leave request {0} not found")]
    RequestNotFound(u64),

    /// Renewal rule or date range is malformed.
    #[error("Invalid leave configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the rule.
        reason: String,
    },

    /// One or more renewal periods would go negative.
    #[error("Not enough leave balance for {}", .periods.join(", "))]
    InsufficientBalance {
        /// Labels of the offending periods, formatted per the renewal rule.
        periods: Vec<String>,
    },

    /// Attempted a status transition on a request that is no longer pending.
    #[error("Leave request {id} is already {status}")]
    InvalidStateTransition {
        /// The request acted on.
        id: u64,
        /// Its current, terminal status.
        status: LeaveStatus,
    },

    /// A bucket that should have been materialized at apply time is gone.
    /// Internal consistency fault; restoring without it would silently
    /// under-restore the balance.
    #[error(
        "Balance bucket missing for employee {employee_id}, leave type {leave_type_id}, period starting {period_start}"
    )]
    BucketMissing {
        /// The employee whose bucket is absent.
        employee_id: u64,
        /// The leave type of the absent bucket.
        leave_type_id: u64,
        /// The period start that should have had a row.
        period_start: NaiveDate,
    },

    /// Storage layer failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// HTTP status code this error maps to at the API boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidConfiguration { .. }
            | Self::InsufficientBalance { .. }
            | Self::InvalidStateTransition { .. } => 400,

            Self::LeaveTypeNotFound(_) | Self::RequestNotFound(_) => 404,

            Self::BucketMissing { .. } | Self::Storage(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_names_periods() {
        let err = LedgerError::InsufficientBalance {
            periods: vec!["Mar".to_string(), "Apr".to_string()],
        };
        assert_eq!(err.to_string(), "Not enough leave balance for Mar, Apr");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn state_transition_reports_current_status() {
        let err = LedgerError::InvalidStateTransition {
            id: 7,
            status: LeaveStatus::Rejected,
        };
        assert_eq!(err.to_string(), "Leave request 7 is already rejected");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn consistency_faults_are_internal() {
        let err = LedgerError::BucketMissing {
            employee_id: 1,
            leave_type_id: 2,
            period_start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        };
        assert_eq!(err.status_code(), 500);
    }
}
