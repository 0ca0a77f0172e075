use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::{LeaveError, LeaveResult};
use crate::model::balance::LeaveBalance;
use crate::model::holiday::HolidayCalendar;
use crate::model::leave_request::{
    BadgeTone, DayCount, LeaveCategory, LeaveRequest, LeaveRevision, LeaveStatus, NewLeaveRequest,
};
use crate::model::lifecycle::{LeaveAction, TransitionOutcome};
use crate::store::{LeaveFilter, LeavePage, LeaveStore};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

const TO_PROCESS: &[LeaveStatus] = &[LeaveStatus::Soumise, LeaveStatus::ValideeDirect];
const HISTORY: &[LeaveStatus] = &[
    LeaveStatus::Approuvee,
    LeaveStatus::ValideeService,
    LeaveStatus::Rejetee,
    LeaveStatus::Payee,
];

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    /// Requesting employee; defaults to the caller's own record
    #[serde(rename = "salarie")]
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    #[serde(rename = "type_conge")]
    pub category: LeaveCategory,
    #[serde(rename = "date_debut")]
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[serde(rename = "date_fin")]
    #[schema(example = "2026-01-09", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// Proposed count; the working-day count is used when absent
    #[serde(rename = "nombre_jours")]
    #[schema(example = 5.0, value_type = Option<f64>)]
    pub day_count: Option<DayCount>,
    #[serde(rename = "motif")]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct AmendLeave {
    #[serde(rename = "type_conge")]
    pub category: Option<LeaveCategory>,
    #[serde(rename = "date_debut")]
    #[schema(example = "2026-01-05", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "date_fin")]
    #[schema(example = "2026-01-09", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "motif")]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ConfirmDays {
    /// Corrected count; the current count is confirmed when absent
    #[serde(rename = "nombre_jours", default)]
    #[schema(example = 4.5, value_type = Option<f64>)]
    pub day_count: Option<DayCount>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveListQuery {
    /// Filter by employee ID
    #[param(example = 1000)]
    pub employee_id: Option<u64>,
    /// Filter by status
    #[param(example = "soumise", value_type = Option<String>)]
    pub statut: Option<LeaveStatus>,
    /// Filter by leave type
    #[param(example = "normal", value_type = Option<String>)]
    pub type_conge: Option<LeaveCategory>,
    /// Year of the start date
    #[param(example = 2026)]
    pub year: Option<i32>,
    /// Pagination page number (start with 1)
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[param(example = 10)]
    pub per_page: Option<u64>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 10)]
    pub per_page: Option<u64>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BalanceQuery {
    /// Other employee (HR/Admin only)
    pub employee_id: Option<u64>,
    /// Defaults to the current year
    #[param(example = 2026)]
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct StatusInfo {
    pub value: LeaveStatus,
    #[schema(example = "Validée par responsable", value_type = String)]
    pub label: &'static str,
    pub badge: BadgeTone,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryInfo {
    pub value: LeaveCategory,
    #[schema(example = "Congé normal", value_type = String)]
    pub label: &'static str,
}

async fn load(store: &dyn LeaveStore, leave_id: u64) -> LeaveResult<LeaveRequest> {
    store.fetch(leave_id).await?.ok_or(LeaveError::NotFound(leave_id))
}

/* =========================
Create a draft
========================= */
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Draft created", body = LeaveRequest),
        (status = 400, description = "Invalid dates or day count"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 503, description = "Leave backend unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(name = "create_leave", skip(auth, store, payload), fields(user_id = auth.user_id))]
pub async fn create_leave(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();

    let employee_id = match payload.employee_id {
        Some(id) if auth.employee_id != Some(id) => {
            if !auth.role.may_perform(&LeaveAction::Create) {
                return Err(LeaveError::forbidden("Only HR/Admin can request leave for someone else").into());
            }
            id
        }
        Some(id) => id,
        None => auth.require_employee()?,
    };

    let draft = LeaveRequest::draft(
        NewLeaveRequest {
            employee_id,
            category: payload.category,
            start_date: payload.start_date,
            end_date: payload.end_date,
            day_count: payload.day_count,
            reason: payload.reason,
        },
        &HolidayCalendar::france(),
        Utc::now(),
    )
    .map_err(LeaveError::from)?;

    let stored = store.insert(&draft).await?;
    tracing::info!(leave_id = ?stored.id, employee_id, "Leave draft created");

    Ok(HttpResponse::Created().json(stored))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "error": "not_found",
            "message": "leave request 1 not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request = load(store.get_ref(), path.into_inner()).await?;
    auth.require_view(&request)?;
    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Amend a draft
========================= */
#[utoipa::path(
    patch,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the draft to change")
    ),
    request_body(content = AmendLeave, content_type = "application/json"),
    responses(
        (status = 200, description = "Draft updated; the day count must be confirmed again", body = LeaveRequest),
        (status = 400, description = "Not a draft, or invalid dates"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(name = "amend_leave", skip(auth, store, payload), fields(user_id = auth.user_id))]
pub async fn amend_leave(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    path: web::Path<u64>,
    payload: web::Json<AmendLeave>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let request = load(store.get_ref(), leave_id).await?;
    auth.require_edit(&request)?;

    let payload = payload.into_inner();
    let amended = request
        .amend(
            LeaveRevision {
                category: payload.category,
                start_date: payload.start_date,
                end_date: payload.end_date,
                reason: payload.reason,
            },
            &HolidayCalendar::france(),
        )
        .map_err(LeaveError::from)?;

    store.update(request.status, &amended).await?;
    tracing::info!(leave_id, "Leave draft amended");

    Ok(HttpResponse::Ok().json(amended))
}

/* =========================
Confirm the day count
========================= */
#[utoipa::path(
    post,
    path = "/api/leave/{leave_id}/confirm-days",
    params(
        ("leave_id" = u64, Path, description = "ID of the draft")
    ),
    request_body(content = ConfirmDays, content_type = "application/json"),
    responses(
        (status = 200, description = "Day count confirmed", body = LeaveRequest),
        (status = 400, description = "Not a draft, or the count is not positive"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(name = "confirm_days", skip(auth, store, payload), fields(user_id = auth.user_id))]
pub async fn confirm_days(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    path: web::Path<u64>,
    payload: web::Json<ConfirmDays>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let request = load(store.get_ref(), leave_id).await?;
    auth.require_edit(&request)?;

    let days = payload.day_count.or(request.day_count).unwrap_or(DayCount::ZERO);
    let confirmed = request.confirm_days(days).map_err(LeaveError::from)?;

    store.update(request.status, &confirmed).await?;
    tracing::info!(leave_id, days = %days, "Leave day count confirmed");

    Ok(HttpResponse::Ok().json(confirmed))
}

/* =========================
Lifecycle actions
========================= */
/// Submit, approve (direct then service), reject or mark paid
#[utoipa::path(
    post,
    path = "/api/leave/{leave_id}/actions",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request")
    ),
    request_body(
        content = LeaveAction,
        content_type = "application/json",
        example = json!({"action": "reject", "rejectionReason": "Période de clôture"})
    ),
    responses(
        (status = 200, description = "Transition applied", body = TransitionOutcome),
        (status = 400, description = "Transition not allowed from the current status", body = Object, example = json!({
            "error": "validation_error",
            "message": "action `approveService` is not allowed while the request is `soumise`"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not perform this action, or the caller reviews their own request"),
        (status = 404, description = "Leave request not found"),
        (status = 503, description = "Leave backend unavailable, nothing was changed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(
    name = "leave_action",
    skip(auth, store, payload),
    fields(user_id = auth.user_id, user = %auth.username, action = payload.name())
)]
pub async fn leave_action(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    path: web::Path<u64>,
    payload: web::Json<LeaveAction>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let action = payload.into_inner();
    let request = load(store.get_ref(), leave_id).await?;

    if action.is_review() && auth.owns(&request) {
        return Err(LeaveError::forbidden(format!("You may not {} your own leave request", action.name())).into());
    }
    let own_request = matches!(action, LeaveAction::Create | LeaveAction::Submit) && auth.owns(&request);
    if !own_request && !auth.role.may_perform(&action) {
        return Err(LeaveError::forbidden(format!("Your role may not {} this request", action.name())).into());
    }

    let outcome = request
        .apply(&action, auth.user_id, Utc::now())
        .map_err(LeaveError::from)?;

    store.update(request.status, &outcome.updated_fields).await?;
    tracing::info!(leave_id, from = %request.status, to = %outcome.new_status, "Leave request transitioned");

    Ok(HttpResponse::Ok().json(outcome))
}

/// Administrative removal of a leave request (HR/Admin)
#[utoipa::path(
    delete,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to delete")
    ),
    responses(
        (status = 200, description = "Leave request deleted", body = Object, example = json!({
            "message": "Leave request deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    if !store.delete(leave_id).await? {
        return Err(LeaveError::NotFound(leave_id).into());
    }
    tracing::warn!(leave_id, user = %auth.username, "Leave request deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request deleted"
    })))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveListQuery),
    responses(
        (status = 200, description = "Paginated leave list", body = LeavePage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    query: web::Query<LeaveListQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_reviewer()?;

    let query = query.into_inner();
    let filter = LeaveFilter {
        employee_id: query.employee_id,
        statuses: query.statut.into_iter().collect(),
        category: query.type_conge,
        year: query.year,
        ..Default::default()
    }
    .paginate(query.page, query.per_page);

    Ok(HttpResponse::Ok().json(store.list(&filter).await?))
}

/// The caller's own leave requests
#[utoipa::path(
    get,
    path = "/api/leave/mine",
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated leave list", body = LeavePage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leave(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    query: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let filter = LeaveFilter::for_employee(employee_id).paginate(query.page, query.per_page);
    Ok(HttpResponse::Ok().json(store.list(&filter).await?))
}

/// Requests waiting for a manager
#[utoipa::path(
    get,
    path = "/api/leave/to-process",
    params(PageQuery),
    responses(
        (status = 200, description = "Submitted and direct-approved requests", body = LeavePage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn to_process(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    query: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_reviewer()?;
    let filter = LeaveFilter::with_statuses(TO_PROCESS).paginate(query.page, query.per_page);
    Ok(HttpResponse::Ok().json(store.list(&filter).await?))
}

/// Settled requests
#[utoipa::path(
    get,
    path = "/api/leave/history",
    params(PageQuery),
    responses(
        (status = 200, description = "Approved, rejected and paid requests", body = LeavePage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn history(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    query: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_reviewer()?;
    let filter = LeaveFilter::with_statuses(HISTORY).paginate(query.page, query.per_page);
    Ok(HttpResponse::Ok().json(store.list(&filter).await?))
}

/// Yearly paid-leave balance
#[utoipa::path(
    get,
    path = "/api/leave/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Balance", body = LeaveBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn balance(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    config: web::Data<Config>,
    query: web::Query<BalanceQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = match query.employee_id {
        Some(id) if auth.employee_id != Some(id) => {
            auth.require_hr_or_admin()?;
            id
        }
        Some(id) => id,
        None => auth.require_employee()?,
    };
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let filter = LeaveFilter {
        year: Some(year),
        ..LeaveFilter::for_employee(employee_id)
    };
    let requests = store.list(&filter).await?.data;

    Ok(HttpResponse::Ok().json(LeaveBalance::compute(
        employee_id,
        year,
        DayCount::whole_days(config.annual_leave_days),
        &requests,
    )))
}

/// Status values with their display label and badge colour
#[utoipa::path(
    get,
    path = "/api/leave/statuses",
    responses(
        (status = 200, description = "Every status", body = [StatusInfo]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn statuses(_auth: AuthUser) -> impl Responder {
    let statuses: Vec<StatusInfo> = LeaveStatus::iter()
        .map(|status| StatusInfo {
            value: status,
            label: status.label(),
            badge: status.badge(),
        })
        .collect();
    HttpResponse::Ok().json(statuses)
}

/// Leave types with their display label
#[utoipa::path(
    get,
    path = "/api/leave/categories",
    responses(
        (status = 200, description = "Every leave type", body = [CategoryInfo]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn categories(_auth: AuthUser) -> impl Responder {
    let categories: Vec<CategoryInfo> = LeaveCategory::iter()
        .map(|category| CategoryInfo {
            value: category,
            label: category.label(),
        })
        .collect();
    HttpResponse::Ok().json(categories)
}
