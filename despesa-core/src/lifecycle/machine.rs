use std::fmt;

use crate::error::AppError;
use crate::models::request::RequestStatus;

/// Named transitions of the request workflow.
///
/// The state machine progresses through these stages:
/// - DirectorateApproval: first-stage sign-off by a department director
/// - FinanceApproval: second-stage sign-off triggering actual payment
/// - AccountabilitySubmission: the employee files the itemized report
/// - Conclusion: finance closes out the settled request
/// - Rejection: terminal refusal, only before payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowTransition {
    DirectorateApproval,
    FinanceApproval,
    AccountabilitySubmission,
    Conclusion,
    Rejection,
}

impl fmt::Display for WorkflowTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowTransition::DirectorateApproval => write!(f, "directorate approval"),
            WorkflowTransition::FinanceApproval => write!(f, "finance approval"),
            WorkflowTransition::AccountabilitySubmission => write!(f, "accountability submission"),
            WorkflowTransition::Conclusion => write!(f, "conclusion"),
            WorkflowTransition::Rejection => write!(f, "rejection"),
        }
    }
}

impl WorkflowTransition {
    /// The status a request holds after this transition.
    pub fn target(&self) -> RequestStatus {
        match self {
            WorkflowTransition::DirectorateApproval => RequestStatus::DirectorateApproved,
            WorkflowTransition::FinanceApproval => RequestStatus::Paid,
            WorkflowTransition::AccountabilitySubmission => RequestStatus::AccountabilityReported,
            WorkflowTransition::Conclusion => RequestStatus::Concluded,
            WorkflowTransition::Rejection => RequestStatus::Rejected,
        }
    }

    /// Whether this transition may fire from the given status.
    ///
    /// This is the single validity table shared by all request kinds.
    /// Rejection is legal only before payment: once a request is Paid
    /// the money is out the door and a refund flow, not a rejection,
    /// would be needed to undo it. Rejecting an already-rejected
    /// request is an error, not a silent no-op.
    pub fn allowed_from(&self, current: RequestStatus) -> bool {
        match self {
            WorkflowTransition::DirectorateApproval => current == RequestStatus::Requested,
            WorkflowTransition::FinanceApproval => current == RequestStatus::DirectorateApproved,
            WorkflowTransition::AccountabilitySubmission => current == RequestStatus::Paid,
            WorkflowTransition::Conclusion => current == RequestStatus::AccountabilityReported,
            WorkflowTransition::Rejection => matches!(
                current,
                RequestStatus::Requested | RequestStatus::DirectorateApproved
            ),
        }
    }

    /// Validates the transition against the current status and returns
    /// the next status, or an `InvalidTransition` error naming both.
    pub fn apply(&self, current: RequestStatus) -> Result<RequestStatus, AppError> {
        if self.allowed_from(current) {
            Ok(self.target())
        } else {
            Err(AppError::InvalidTransition(format!(
                "cannot apply {} while status is {}",
                self, current
            )))
        }
    }

    /// Status assigned to a freshly submitted request.
    pub fn initial_status() -> RequestStatus {
        RequestStatus::Requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_through_conclusion() {
        let mut status = WorkflowTransition::initial_status();
        for transition in [
            WorkflowTransition::DirectorateApproval,
            WorkflowTransition::FinanceApproval,
            WorkflowTransition::AccountabilitySubmission,
            WorkflowTransition::Conclusion,
        ] {
            status = transition.apply(status).expect("transition should be legal");
        }
        assert_eq!(status, RequestStatus::Concluded);
    }

    #[test]
    fn test_directorate_approval_requires_requested() {
        for status in [
            RequestStatus::DirectorateApproved,
            RequestStatus::Paid,
            RequestStatus::AccountabilityReported,
            RequestStatus::Concluded,
            RequestStatus::Rejected,
        ] {
            let err = WorkflowTransition::DirectorateApproval
                .apply(status)
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidTransition(_)));
        }
    }

    #[test]
    fn test_finance_approval_requires_directorate_approval() {
        assert!(WorkflowTransition::FinanceApproval
            .apply(RequestStatus::Requested)
            .is_err());
        assert_eq!(
            WorkflowTransition::FinanceApproval
                .apply(RequestStatus::DirectorateApproved)
                .unwrap(),
            RequestStatus::Paid
        );
    }

    #[test]
    fn test_rejection_only_before_payment() {
        assert!(WorkflowTransition::Rejection
            .apply(RequestStatus::Requested)
            .is_ok());
        assert!(WorkflowTransition::Rejection
            .apply(RequestStatus::DirectorateApproved)
            .is_ok());

        let err = WorkflowTransition::Rejection
            .apply(RequestStatus::Paid)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_double_rejection_is_an_error() {
        let err = WorkflowTransition::Rejection
            .apply(RequestStatus::Rejected)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_accountability_requires_paid() {
        assert!(WorkflowTransition::AccountabilitySubmission
            .apply(RequestStatus::Paid)
            .is_ok());
        assert!(WorkflowTransition::AccountabilitySubmission
            .apply(RequestStatus::DirectorateApproved)
            .is_err());
    }

    #[test]
    fn test_conclusion_requires_reported_accounts() {
        assert!(WorkflowTransition::Conclusion
            .apply(RequestStatus::AccountabilityReported)
            .is_ok());
        assert!(WorkflowTransition::Conclusion
            .apply(RequestStatus::Paid)
            .is_err());
    }
}
