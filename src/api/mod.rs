pub mod leave_request;
pub mod working_days;
