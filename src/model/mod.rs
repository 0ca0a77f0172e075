pub mod balance;
pub mod holiday;
pub mod leave_request;
pub mod lifecycle;
pub mod role;
pub mod working_days;
