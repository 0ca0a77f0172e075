use chrono::Datelike;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::leave_request::{DayCount, LeaveRequest};

/// Yearly paid-leave balance (solde de congés) of one employee.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 1000,
    "year": 2026,
    "acquired": 25.0,
    "used": 7.5,
    "pending": 3.0,
    "remaining": 17.5
}))]
pub struct LeaveBalance {
    pub employee_id: u64,
    pub year: i32,
    pub acquired: f64,
    /// approved or paid
    pub used: f64,
    /// waiting for a manager
    pub pending: f64,
    /// `acquired - used`, negative when overdrawn
    pub remaining: f64,
}

impl LeaveBalance {
    /// Only requests of `employee_id` starting in `year` whose category draws
    /// on the allowance are counted; others in `requests` are ignored.
    pub fn compute(employee_id: u64, year: i32, allowance: DayCount, requests: &[LeaveRequest]) -> Self {
        let mut used = 0i64;
        let mut pending = 0i64;

        for request in requests.iter().filter(|r| {
            r.employee_id == employee_id && r.start_date.year() == year && r.category.uses_allowance()
        }) {
            let half_days = request.day_count.map_or(0, DayCount::half_days) as i64;
            if request.status.is_approved() {
                used += half_days;
            } else if request.status.is_awaiting_review() {
                pending += half_days;
            }
        }

        let acquired = allowance.half_days() as i64;
        Self {
            employee_id,
            year,
            acquired: acquired as f64 / 2.0,
            used: used as f64 / 2.0,
            pending: pending as f64 / 2.0,
            remaining: (acquired - used) as f64 / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::tests::{christmas_draft, date};
    use crate::model::leave_request::{LeaveCategory, LeaveStatus};

    fn request(status: LeaveStatus, category: LeaveCategory, half_days: u32) -> LeaveRequest {
        let mut r = christmas_draft();
        r.start_date = date(2026, 2, 2);
        r.end_date = date(2026, 2, 6);
        r.status = status;
        r.category = category;
        r.day_count = Some(DayCount::from_half_days(half_days));
        r
    }

    #[test]
    fn sums_by_status() {
        let requests = vec![
            request(LeaveStatus::Approuvee, LeaveCategory::Normal, 10),
            request(LeaveStatus::Payee, LeaveCategory::Normal, 5),
            request(LeaveStatus::Soumise, LeaveCategory::Normal, 4),
            request(LeaveStatus::ValideeDirect, LeaveCategory::Normal, 2),
            request(LeaveStatus::Rejetee, LeaveCategory::Normal, 8),
            request(LeaveStatus::Brouillon, LeaveCategory::Normal, 8),
        ];
        let balance = LeaveBalance::compute(1000, 2026, DayCount::whole_days(25), &requests);
        assert_eq!(balance.acquired, 25.0);
        assert_eq!(balance.used, 7.5);
        assert_eq!(balance.pending, 3.0);
        assert_eq!(balance.remaining, 17.5);
    }

    #[test]
    fn ignores_other_categories_years_and_employees() {
        let mut other_year = request(LeaveStatus::Approuvee, LeaveCategory::Normal, 10);
        other_year.start_date = date(2025, 12, 29);
        let mut other_employee = request(LeaveStatus::Approuvee, LeaveCategory::Normal, 10);
        other_employee.employee_id = 2;

        let requests = vec![
            request(LeaveStatus::Approuvee, LeaveCategory::Maladie, 10),
            request(LeaveStatus::Approuvee, LeaveCategory::SansSolde, 10),
            other_year,
            other_employee,
        ];
        let balance = LeaveBalance::compute(1000, 2026, DayCount::whole_days(25), &requests);
        assert_eq!(balance.used, 0.0);
        assert_eq!(balance.remaining, 25.0);
    }

    #[test]
    fn can_be_overdrawn() {
        let requests = vec![request(LeaveStatus::Approuvee, LeaveCategory::Normal, 60)];
        let balance = LeaveBalance::compute(1000, 2026, DayCount::whole_days(25), &requests);
        assert_eq!(balance.remaining, -5.0);
    }
}
