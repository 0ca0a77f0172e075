//! Leave-request status machine.
//!
//! ```text
//! brouillon --submit--> soumise --approveDirect--> validée_direct --approveService--> approuvée --markPaid--> payée
//!                          |                            |
//!                          +-----------reject-----------+--> rejetée
//! ```
//!
//! Transitions are computed, never persisted, here: `apply` returns the record
//! the caller should store, and leaves its input untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::model::leave_request::{ApprovalRecord, ApprovalStage, LeaveRequest, LeaveStatus, RejectionRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum LeaveAction {
    Create,
    Submit,
    ApproveDirect {
        #[serde(default)]
        comment: Option<String>,
    },
    ApproveService {
        #[serde(default)]
        comment: Option<String>,
    },
    Reject {
        #[serde(rename = "rejectionReason", default)]
        reason: String,
    },
    MarkPaid,
}

impl LeaveAction {
    pub fn name(&self) -> &'static str {
        match self {
            LeaveAction::Create => "create",
            LeaveAction::Submit => "submit",
            LeaveAction::ApproveDirect { .. } => "approveDirect",
            LeaveAction::ApproveService { .. } => "approveService",
            LeaveAction::Reject { .. } => "reject",
            LeaveAction::MarkPaid => "markPaid",
        }
    }

    /// Approvals and rejections, which the requester may never perform.
    pub fn is_review(&self) -> bool {
        matches!(
            self,
            LeaveAction::ApproveDirect { .. } | LeaveAction::ApproveService { .. } | LeaveAction::Reject { .. }
        )
    }
}

/// Result of a legal transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    pub new_status: LeaveStatus,
    pub updated_fields: LeaveRequest,
}

fn approval(actor_id: u64, at: DateTime<Utc>, comment: &Option<String>) -> ApprovalRecord {
    ApprovalRecord {
        approved: true,
        approver_id: Some(actor_id),
        approved_at: Some(at),
        comment: comment.as_ref().map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
    }
}

impl LeaveRequest {
    /// Applies `action`, performed by `actor_id` at `at`.
    pub fn apply(
        &self,
        action: &LeaveAction,
        actor_id: u64,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, ValidationError> {
        let illegal = || ValidationError::InvalidTransition {
            action: action.name(),
            status: self.status,
        };

        let mut next = self.clone();

        match action {
            LeaveAction::Create => return Err(ValidationError::AlreadyCreated),

            LeaveAction::Submit => {
                if self.status != LeaveStatus::Brouillon {
                    return Err(illegal());
                }
                if self.employee_id == 0 {
                    return Err(ValidationError::MissingSubject);
                }
                if self.end_date < self.start_date {
                    return Err(ValidationError::InvertedDateRange {
                        start: self.start_date,
                        end: self.end_date,
                    });
                }
                if !self.days_confirmed {
                    return Err(ValidationError::DaysNotConfirmed);
                }
                if !self.day_count.is_some_and(|d| d.is_positive()) {
                    return Err(ValidationError::NonPositiveDayCount);
                }
                next.status = LeaveStatus::Soumise;
            }

            LeaveAction::ApproveDirect { comment } => {
                if self.status != LeaveStatus::Soumise {
                    return Err(illegal());
                }
                next.direct_approval = approval(actor_id, at, comment);
                next.status = LeaveStatus::ValideeDirect;
            }

            LeaveAction::ApproveService { comment } => {
                if self.status != LeaveStatus::ValideeDirect {
                    return Err(illegal());
                }
                if !self.direct_approval.approved {
                    return Err(ValidationError::DirectApprovalMissing);
                }
                if self.direct_approval.approver_id == Some(actor_id) {
                    return Err(ValidationError::SameApprover);
                }
                next.service_approval = approval(actor_id, at, comment);
                next.status = LeaveStatus::Approuvee;
            }

            LeaveAction::Reject { reason } => {
                let stage = match self.status {
                    LeaveStatus::Soumise => ApprovalStage::Direct,
                    LeaveStatus::ValideeDirect => ApprovalStage::Service,
                    _ => return Err(illegal()),
                };
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err(ValidationError::MissingRejectionReason);
                }
                next.rejection = RejectionRecord {
                    rejected: true,
                    rejected_at: Some(at),
                    reason: Some(reason.to_string()),
                    stage: Some(stage),
                };
                next.status = LeaveStatus::Rejetee;
            }

            LeaveAction::MarkPaid => {
                if !matches!(self.status, LeaveStatus::Approuvee | LeaveStatus::ValideeService) {
                    return Err(illegal());
                }
                next.status = LeaveStatus::Payee;
            }
        }

        Ok(TransitionOutcome {
            new_status: next.status,
            updated_fields: next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::DayCount;
    use crate::model::leave_request::tests::{christmas_draft, now};
    use strum::IntoEnumIterator;

    const REQUESTER: u64 = 1000;
    const DIRECT: u64 = 11;
    const SERVICE: u64 = 12;
    const PAYROLL: u64 = 13;

    fn all_actions() -> Vec<LeaveAction> {
        vec![
            LeaveAction::Create,
            LeaveAction::Submit,
            LeaveAction::ApproveDirect { comment: None },
            LeaveAction::ApproveService { comment: None },
            LeaveAction::Reject { reason: "charge de travail".into() },
            LeaveAction::MarkPaid,
        ]
    }

    fn in_status(status: LeaveStatus) -> LeaveRequest {
        let mut request = christmas_draft().confirm_days(DayCount::whole_days(3)).unwrap();
        request.id = Some(1);
        request.status = status;
        if matches!(
            status,
            LeaveStatus::ValideeDirect | LeaveStatus::ValideeService | LeaveStatus::Approuvee | LeaveStatus::Payee
        ) {
            request.direct_approval = approval(DIRECT, now(), &None);
        }
        request
    }

    fn step(request: &LeaveRequest, action: LeaveAction, actor: u64) -> LeaveRequest {
        request.apply(&action, actor, now()).unwrap().updated_fields
    }

    #[test]
    fn full_approval_path() {
        let draft = in_status(LeaveStatus::Brouillon);
        let submitted = step(&draft, LeaveAction::Submit, REQUESTER);
        assert_eq!(submitted.status, LeaveStatus::Soumise);

        let direct = step(
            &submitted,
            LeaveAction::ApproveDirect { comment: Some("  Bon pour moi ".into()) },
            DIRECT,
        );
        assert_eq!(direct.status, LeaveStatus::ValideeDirect);
        assert!(direct.direct_approval.approved);
        assert_eq!(direct.direct_approval.approver_id, Some(DIRECT));
        assert_eq!(direct.direct_approval.approved_at, Some(now()));
        assert_eq!(direct.direct_approval.comment.as_deref(), Some("Bon pour moi"));

        let outcome = direct
            .apply(&LeaveAction::ApproveService { comment: None }, SERVICE, now())
            .unwrap();
        assert_eq!(outcome.new_status, LeaveStatus::Approuvee);
        assert_eq!(outcome.updated_fields.service_approval.approver_id, Some(SERVICE));
        assert_eq!(outcome.updated_fields.service_approval.comment, None);

        let paid = step(&outcome.updated_fields, LeaveAction::MarkPaid, PAYROLL);
        assert_eq!(paid.status, LeaveStatus::Payee);
        assert!(!paid.rejection.rejected);
    }

    #[test]
    fn draft_only_accepts_submit() {
        let draft = in_status(LeaveStatus::Brouillon);
        for action in all_actions() {
            let result = draft.apply(&action, REQUESTER, now());
            if action == LeaveAction::Submit {
                assert!(result.is_ok());
            } else {
                assert!(result.is_err(), "{} accepted from brouillon", action.name());
            }
        }
        assert_eq!(draft.status, LeaveStatus::Brouillon);
    }

    #[test]
    fn submitted_accepts_direct_approval_and_rejection_only() {
        let submitted = in_status(LeaveStatus::Soumise);
        assert!(submitted.apply(&LeaveAction::ApproveDirect { comment: None }, DIRECT, now()).is_ok());
        assert!(submitted
            .apply(&LeaveAction::Reject { reason: "non".into() }, DIRECT, now())
            .is_ok());
        assert_eq!(
            submitted
                .apply(&LeaveAction::ApproveService { comment: None }, SERVICE, now())
                .unwrap_err(),
            ValidationError::InvalidTransition {
                action: "approveService",
                status: LeaveStatus::Soumise
            }
        );
    }

    #[test]
    fn terminal_states_refuse_everything() {
        for status in [LeaveStatus::Rejetee, LeaveStatus::Payee] {
            let request = in_status(status);
            for action in all_actions() {
                assert!(
                    request.apply(&action, DIRECT, now()).is_err(),
                    "{} accepted from {}",
                    action.name(),
                    status
                );
            }
        }
    }

    #[test]
    fn rejection_records_stage_and_reason() {
        let from_direct = in_status(LeaveStatus::Soumise)
            .apply(&LeaveAction::Reject { reason: " effectif insuffisant ".into() }, DIRECT, now())
            .unwrap();
        assert_eq!(from_direct.new_status, LeaveStatus::Rejetee);
        let rejection = &from_direct.updated_fields.rejection;
        assert!(rejection.rejected);
        assert_eq!(rejection.reason.as_deref(), Some("effectif insuffisant"));
        assert_eq!(rejection.stage, Some(ApprovalStage::Direct));
        assert_eq!(rejection.rejected_at, Some(now()));

        let from_service = in_status(LeaveStatus::ValideeDirect)
            .apply(&LeaveAction::Reject { reason: "clôture".into() }, SERVICE, now())
            .unwrap();
        assert_eq!(from_service.updated_fields.rejection.stage, Some(ApprovalStage::Service));
        assert!(!from_service.updated_fields.service_approval.approved);
    }

    #[test]
    fn rejection_needs_a_reason() {
        let err = in_status(LeaveStatus::Soumise)
            .apply(&LeaveAction::Reject { reason: "   ".into() }, DIRECT, now())
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingRejectionReason);
    }

    #[test]
    fn approved_requests_cannot_be_rejected() {
        for status in [LeaveStatus::Approuvee, LeaveStatus::ValideeService] {
            let err = in_status(status)
                .apply(&LeaveAction::Reject { reason: "trop tard".into() }, SERVICE, now())
                .unwrap_err();
            assert!(matches!(err, ValidationError::InvalidTransition { action: "reject", .. }));
        }
    }

    #[test]
    fn submit_guards() {
        let mut unconfirmed = in_status(LeaveStatus::Brouillon);
        unconfirmed.days_confirmed = false;
        assert_eq!(
            unconfirmed.apply(&LeaveAction::Submit, REQUESTER, now()).unwrap_err(),
            ValidationError::DaysNotConfirmed
        );

        let mut zero = in_status(LeaveStatus::Brouillon);
        zero.day_count = Some(DayCount::ZERO);
        assert_eq!(
            zero.apply(&LeaveAction::Submit, REQUESTER, now()).unwrap_err(),
            ValidationError::NonPositiveDayCount
        );

        let mut orphan = in_status(LeaveStatus::Brouillon);
        orphan.employee_id = 0;
        assert_eq!(
            orphan.apply(&LeaveAction::Submit, REQUESTER, now()).unwrap_err(),
            ValidationError::MissingSubject
        );
    }

    #[test]
    fn service_approval_needs_direct_record() {
        let mut request = in_status(LeaveStatus::ValideeDirect);
        request.direct_approval = ApprovalRecord::default();
        assert_eq!(
            request
                .apply(&LeaveAction::ApproveService { comment: None }, SERVICE, now())
                .unwrap_err(),
            ValidationError::DirectApprovalMissing
        );
    }

    #[test]
    fn direct_approver_cannot_also_approve_for_service() {
        let request = in_status(LeaveStatus::ValideeDirect);
        let err = request
            .apply(&LeaveAction::ApproveService { comment: None }, DIRECT, now())
            .unwrap_err();
        assert_eq!(err, ValidationError::SameApprover);
        assert_eq!(request.status, LeaveStatus::ValideeDirect);
        assert!(!request.service_approval.approved);
    }

    #[test]
    fn review_actions() {
        let reviews: Vec<&str> = all_actions()
            .iter()
            .filter(|a| a.is_review())
            .map(LeaveAction::name)
            .collect();
        assert_eq!(reviews, vec!["approveDirect", "approveService", "reject"]);
    }

    #[test]
    fn legacy_service_validated_can_be_paid() {
        let paid = step(&in_status(LeaveStatus::ValideeService), LeaveAction::MarkPaid, PAYROLL);
        assert_eq!(paid.status, LeaveStatus::Payee);
    }

    #[test]
    fn create_is_never_a_transition() {
        for status in LeaveStatus::iter() {
            assert_eq!(
                in_status(status).apply(&LeaveAction::Create, REQUESTER, now()).unwrap_err(),
                ValidationError::AlreadyCreated
            );
        }
    }

    #[test]
    fn action_wire_format() {
        let action: LeaveAction =
            serde_json::from_str(r#"{"action":"reject","rejectionReason":"doublon"}"#).unwrap();
        assert_eq!(action, LeaveAction::Reject { reason: "doublon".into() });

        let action: LeaveAction = serde_json::from_str(r#"{"action":"approveDirect"}"#).unwrap();
        assert_eq!(action, LeaveAction::ApproveDirect { comment: None });

        let action: LeaveAction = serde_json::from_str(r#"{"action":"markPaid"}"#).unwrap();
        assert_eq!(action, LeaveAction::MarkPaid);

        let outcome = in_status(LeaveStatus::Brouillon)
            .apply(&LeaveAction::Submit, REQUESTER, now())
            .unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["newStatus"], "soumise");
        assert_eq!(json["updatedFields"]["statut"], "soumise");
    }
}
