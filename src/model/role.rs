use crate::model::lifecycle::LeaveAction;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    DirectManager = 4,
    ServiceManager = 5,
    Payroll = 6,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::DirectManager),
            5 => Some(Role::ServiceManager),
            6 => Some(Role::Payroll),
            _ => None,
        }
    }

    pub fn is_hr_or_admin(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }

    /// Roles that see other employees' requests.
    pub fn is_reviewer(self) -> bool {
        self != Role::Employee
    }

    /// Role gate for lifecycle actions. Acting on one's own request
    /// (create/submit) is checked separately against the request owner.
    pub fn may_perform(self, action: &LeaveAction) -> bool {
        match action {
            LeaveAction::Create | LeaveAction::Submit => self.is_hr_or_admin(),
            LeaveAction::ApproveDirect { .. } => {
                matches!(self, Role::DirectManager | Role::Hr | Role::Admin)
            }
            LeaveAction::ApproveService { .. } => {
                matches!(self, Role::ServiceManager | Role::Hr | Role::Admin)
            }
            LeaveAction::Reject { .. } => matches!(
                self,
                Role::DirectManager | Role::ServiceManager | Role::Hr | Role::Admin
            ),
            LeaveAction::MarkPaid => matches!(self, Role::Payroll | Role::Admin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for id in 1..=6u8 {
            assert_eq!(Role::from_id(id).map(|r| r as u8), Some(id));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(7), None);
    }

    #[test]
    fn approval_stages_are_split_between_managers() {
        let direct = LeaveAction::ApproveDirect { comment: None };
        let service = LeaveAction::ApproveService { comment: None };
        assert!(Role::DirectManager.may_perform(&direct));
        assert!(!Role::DirectManager.may_perform(&service));
        assert!(Role::ServiceManager.may_perform(&service));
        assert!(!Role::ServiceManager.may_perform(&direct));
        assert!(!Role::Employee.may_perform(&direct));
        assert!(!Role::Employee.may_perform(&LeaveAction::MarkPaid));
        assert!(Role::Payroll.may_perform(&LeaveAction::MarkPaid));
        assert!(!Role::Hr.may_perform(&LeaveAction::MarkPaid));
    }
}
