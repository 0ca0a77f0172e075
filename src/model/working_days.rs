//! Working-day (jours ouvrables) count for a leave period.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::model::holiday::HolidayCalendar;

/// Longest period, in calendar days, that may be counted or requested.
pub const MAX_RANGE_DAYS: i64 = 3 * 366;

/// Day count for an inclusive date range plus the dates that were left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "workingDays": 3,
    "weekendDates": [],
    "holidayDates": ["25/12/2024 (Noël)"],
    "weekendCount": 0,
    "holidayCount": 1
}))]
pub struct WorkingDays {
    pub working_days: u32,
    /// `dd/mm/yyyy (weekday)`
    pub weekend_dates: Vec<String>,
    /// `dd/mm/yyyy (holiday name)`
    pub holiday_dates: Vec<String>,
    pub weekend_count: usize,
    pub holiday_count: usize,
}

fn french_day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Lundi",
        Weekday::Tue => "Mardi",
        Weekday::Wed => "Mercredi",
        Weekday::Thu => "Jeudi",
        Weekday::Fri => "Vendredi",
        Weekday::Sat => "Samedi",
        Weekday::Sun => "Dimanche",
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Refuses periods of more than [`MAX_RANGE_DAYS`] days, end included.
pub fn check_span(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if (end - start).num_days() >= MAX_RANGE_DAYS {
        return Err(ValidationError::RangeTooLong {
            start,
            end,
            max_days: MAX_RANGE_DAYS,
        });
    }
    Ok(())
}

/// Counts Monday-Friday dates of `start..=end` that are not holidays.
///
/// A range whose end is not strictly after its start counts zero days and
/// excludes nothing. Weekend dates that are also holidays are listed in both
/// breakdowns but only subtracted once.
pub fn count_working_days(calendar: &HolidayCalendar, start: NaiveDate, end: NaiveDate) -> WorkingDays {
    if end <= start {
        return WorkingDays::default();
    }

    let mut result = WorkingDays::default();

    for date in start.iter_days().take_while(|d| *d <= end) {
        let label = date.format("%d/%m/%Y");
        if let Some(name) = calendar.holiday_on(date) {
            result.holiday_dates.push(format!("{} ({})", label, name));
        }

        if is_weekend(date) {
            result
                .weekend_dates
                .push(format!("{} ({})", label, french_day_name(date.weekday())));
        } else if !calendar.is_holiday(date) {
            result.working_days += 1;
        }
    }

    result.weekend_count = result.weekend_dates.len();
    result.holiday_count = result.holiday_dates.len();
    result
}
