use crate::api::leave_request::{AmendLeave, CategoryInfo, ConfirmDays, CreateLeave, StatusInfo};
use crate::api::working_days::WorkingDaysQuery;
use crate::model::balance::LeaveBalance;
use crate::model::holiday::Holiday;
use crate::model::leave_request::{
    ApprovalRecord, ApprovalStage, BadgeTone, LeaveCategory, LeaveRequest, LeaveStatus, RejectionRecord,
};
use crate::model::lifecycle::{LeaveAction, TransitionOutcome};
use crate::model::working_days::WorkingDays;
use crate::store::LeavePage;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TeamHub Leave API",
        version = "1.0.0",
        description = r#"
## Leave requests (congés)

Lifecycle of employee leave requests with a two-step approval:

- **brouillon** → *submit* → **soumise** → *approveDirect* → **validée_direct** → *approveService* → **approuvée** → *markPaid* → **payée**
- *reject* (with a reason) from **soumise** or **validée_direct** → **rejetée**

The number of days is computed from the working days of the period
(weekends and French public holidays excluded) and must be confirmed by the
requester, who may correct it in half-day steps, before submitting.

### 🔐 Security
Every endpoint requires a **JWT Bearer** access token issued by the TeamHub auth service.
Actions are gated by role: direct manager, service manager, HR, payroll, admin.

### 📦 Response Format
- JSON; request fields keep the backend's French names (`statut`, `date_debut`, ...)
- Errors are `{ "error": <kind>, "message": <text> }`
"#,
    ),
    paths(
        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::my_leave,
        crate::api::leave_request::to_process,
        crate::api::leave_request::history,
        crate::api::leave_request::balance,
        crate::api::leave_request::statuses,
        crate::api::leave_request::categories,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::amend_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::confirm_days,
        crate::api::leave_request::leave_action,

        crate::api::working_days::working_days,
        crate::api::working_days::holidays
    ),
    components(
        schemas(
            CreateLeave,
            AmendLeave,
            ConfirmDays,
            LeaveRequest,
            LeaveStatus,
            LeaveCategory,
            ApprovalRecord,
            ApprovalStage,
            RejectionRecord,
            LeaveAction,
            TransitionOutcome,
            LeavePage,
            LeaveBalance,
            StatusInfo,
            CategoryInfo,
            BadgeTone,
            WorkingDaysQuery,
            WorkingDays,
            Holiday
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request lifecycle APIs"),
        (name = "Calendar", description = "Working days and public holidays"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_with_bearer_auth() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/leave",
            "/api/leave/{leave_id}",
            "/api/leave/{leave_id}/actions",
            "/api/leave/{leave_id}/confirm-days",
            "/api/working-days",
            "/api/holidays/{year}",
        ] {
            assert!(paths.contains_key(path), "{path} missing");
        }
        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
