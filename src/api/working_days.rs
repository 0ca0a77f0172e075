use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::model::holiday::{Holiday, HolidayCalendar};
use crate::model::working_days::{WorkingDays, check_span, count_working_days};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkingDaysQuery {
    #[schema(example = "2024-12-23", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-12-26", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

/// Working days between two dates, weekends and French public holidays excluded
#[utoipa::path(
    post,
    path = "/api/working-days",
    request_body(
        content = WorkingDaysQuery,
        description = "Inclusive date range",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Working-day count and the dates left out", body = WorkingDays),
        (status = 400, description = "Malformed dates, or a period longer than three years"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar"
)]
#[instrument(name = "working_days", skip(_auth, payload), fields(start = %payload.start_date, end = %payload.end_date))]
pub async fn working_days(
    _auth: AuthUser,
    payload: web::Json<WorkingDaysQuery>,
) -> actix_web::Result<impl Responder> {
    check_span(payload.start_date, payload.end_date).map_err(LeaveError::from)?;

    let result: WorkingDays = count_working_days(&HolidayCalendar::france(), payload.start_date, payload.end_date);
    Ok(HttpResponse::Ok().json(result))
}

/// Public holidays of a year
#[utoipa::path(
    get,
    path = "/api/holidays/{year}",
    params(
        ("year" = i32, Path, description = "Calendar year", example = 2026)
    ),
    responses(
        (status = 200, description = "Holidays sorted by date", body = [Holiday]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar"
)]
pub async fn holidays(_auth: AuthUser, path: web::Path<i32>) -> impl Responder {
    let holidays: Vec<Holiday> = HolidayCalendar::france().holidays_in(path.into_inner());
    HttpResponse::Ok().json(holidays)
}
