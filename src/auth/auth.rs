use crate::error::{LeaveError, LeaveResult};
use crate::model::leave_request::LeaveRequest;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// The caller of a protected route, put in the request extensions by
/// [`auth_middleware`](crate::auth::middleware::auth_middleware).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Missing token")),
        )
    }
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> LeaveResult<()> {
        if self.role.is_hr_or_admin() {
            Ok(())
        } else {
            Err(LeaveError::forbidden("HR/Admin only"))
        }
    }

    pub fn require_reviewer(&self) -> LeaveResult<()> {
        if self.role.is_reviewer() {
            Ok(())
        } else {
            Err(LeaveError::forbidden("Managers, HR, payroll or admin only"))
        }
    }

    /// The employee record this user acts as.
    pub fn require_employee(&self) -> LeaveResult<u64> {
        self.employee_id
            .ok_or_else(|| LeaveError::forbidden("No employee profile"))
    }

    pub fn owns(&self, request: &LeaveRequest) -> bool {
        self.employee_id == Some(request.employee_id)
    }

    pub fn require_view(&self, request: &LeaveRequest) -> LeaveResult<()> {
        if self.owns(request) || self.role.is_reviewer() {
            Ok(())
        } else {
            Err(LeaveError::forbidden("Not your leave request"))
        }
    }

    /// Drafts are edited by their owner, or by HR/Admin on the owner's behalf.
    pub fn require_edit(&self, request: &LeaveRequest) -> LeaveResult<()> {
        if self.owns(request) || self.role.is_hr_or_admin() {
            Ok(())
        } else {
            Err(LeaveError::forbidden("Only the requester or HR/Admin can change this request"))
        }
    }
}
