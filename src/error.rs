use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use serde_json::json;

use crate::model::leave_request::LeaveStatus;

/// A transition guard or input constraint was violated. Nothing was changed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("action `{action}` is not allowed while the request is `{status}`")]
    InvalidTransition {
        action: &'static str,
        status: LeaveStatus,
    },

    #[error("the leave request already exists")]
    AlreadyCreated,

    #[error("a requesting employee must be set")]
    MissingSubject,

    #[error("end date {end} is before start date {start}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("the period {start} to {end} is longer than {max_days} days")]
    RangeTooLong {
        start: NaiveDate,
        end: NaiveDate,
        max_days: i64,
    },

    #[error("the number of days must be confirmed before submitting")]
    DaysNotConfirmed,

    #[error("the number of days must be positive")]
    NonPositiveDayCount,

    #[error("invalid number of days {0}: expected a non-negative multiple of 0.5")]
    InvalidDayCount(f64),

    #[error("a rejection reason is required")]
    MissingRejectionReason,

    #[error("the direct manager must approve before the service manager")]
    DirectApprovalMissing,

    #[error("the service approval must come from someone other than the direct approver")]
    SameApprover,

    #[error("only draft requests can be changed, this one is `{0}`")]
    NotADraft(LeaveStatus),

    #[error("the request is no longer `{expected}`, reload it and retry")]
    StatusChanged { expected: LeaveStatus },
}

#[derive(Debug, thiserror::Error)]
pub enum LeaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend call that would persist (or read) the request failed.
    #[error("backend communication failed: {0}")]
    Communication(String),

    #[error("leave request {0} not found")]
    NotFound(u64),

    #[error("{0}")]
    Forbidden(String),
}

impl LeaveError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        LeaveError::Forbidden(msg.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            LeaveError::Validation(_) => "validation_error",
            LeaveError::Communication(_) => "communication_error",
            LeaveError::NotFound(_) => "not_found",
            LeaveError::Forbidden(_) => "forbidden",
        }
    }
}

impl From<sqlx::Error> for LeaveError {
    fn from(e: sqlx::Error) -> Self {
        LeaveError::Communication(e.to_string())
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_) => StatusCode::BAD_REQUEST,
            LeaveError::Communication(_) => StatusCode::SERVICE_UNAVAILABLE,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            LeaveError::Communication(details) => {
                tracing::error!(error = %details, "Leave backend unavailable");
                "Leave backend unavailable, nothing was changed".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": message,
        }))
    }
}

pub type LeaveResult<T> = Result<T, LeaveError>;
