//! Persistence of leave requests.
//!
//! Any failure to reach or understand the backend is reported as
//! [`LeaveError::Communication`](crate::error::LeaveError::Communication);
//! a failed write leaves the stored request as it was.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::LeaveResult;
use crate::model::leave_request::{LeaveCategory, LeaveRequest, LeaveStatus};

pub mod memory;
pub mod mysql;

pub use memory::InMemoryLeaveStore;
pub use mysql::MySqlLeaveStore;

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub employee_id: Option<u64>,
    /// Any of these; empty means every status.
    pub statuses: Vec<LeaveStatus>,
    pub category: Option<LeaveCategory>,
    /// Year of the start date.
    pub year: Option<i32>,
    /// 1-based; `None` returns everything.
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl LeaveFilter {
    pub fn for_employee(employee_id: u64) -> Self {
        Self {
            employee_id: Some(employee_id),
            ..Default::default()
        }
    }

    pub fn with_statuses(statuses: &[LeaveStatus]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            ..Default::default()
        }
    }

    pub fn paginate(mut self, page: Option<u64>, per_page: Option<u64>) -> Self {
        self.page = Some(page.unwrap_or(1).max(1));
        self.per_page = Some(per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE));
        self
    }

    /// `(limit, offset)` when paginated.
    pub fn window(&self) -> Option<(u64, u64)> {
        let page = self.page?;
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        Some((per_page, page.saturating_sub(1).saturating_mul(per_page)))
    }

    pub fn matches(&self, request: &LeaveRequest) -> bool {
        use chrono::Datelike;

        self.employee_id.is_none_or(|id| request.employee_id == id)
            && (self.statuses.is_empty() || self.statuses.contains(&request.status))
            && self.category.is_none_or(|c| request.category == c)
            && self.year.is_none_or(|y| request.start_date.year() == y)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeavePage {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Persists a new request and returns it with its id.
    async fn insert(&self, request: &LeaveRequest) -> LeaveResult<LeaveRequest>;

    async fn fetch(&self, id: u64) -> LeaveResult<Option<LeaveRequest>>;

    /// Replaces the stored request if its status is still `expected`,
    /// failing with `ValidationError::StatusChanged` otherwise.
    async fn update(&self, expected: LeaveStatus, request: &LeaveRequest) -> LeaveResult<()>;

    /// Newest first.
    async fn list(&self, filter: &LeaveFilter) -> LeaveResult<LeavePage>;

    /// `false` when there was nothing to delete.
    async fn delete(&self, id: u64) -> LeaveResult<bool>;
}
