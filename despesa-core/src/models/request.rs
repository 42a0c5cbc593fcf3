use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// The four kinds of expense request sharing the lifecycle workflow.
///
/// The workflow itself is identical across kinds; only the user-facing
/// status vocabulary differs (see [`RequestKind::status_label`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    #[sqlx(rename = "advance")]
    Advance,

    #[sqlx(rename = "reimbursement")]
    Reimbursement,

    #[sqlx(rename = "airfare")]
    Airfare,

    #[sqlx(rename = "lodging")]
    Lodging,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Advance => write!(f, "advance"),
            RequestKind::Reimbursement => write!(f, "reimbursement"),
            RequestKind::Airfare => write!(f, "airfare"),
            RequestKind::Lodging => write!(f, "lodging"),
        }
    }
}

impl RequestKind {
    /// User-facing label for a canonical status, in the vocabulary the
    /// business uses for this request kind. Airfare is "issued" and
    /// lodging "confirmed" where the money kinds say "paid".
    pub fn status_label(&self, status: RequestStatus) -> &'static str {
        match status {
            RequestStatus::Requested => "Solicitado",
            RequestStatus::DirectorateApproved => "Aprovado pela Diretoria",
            RequestStatus::Paid => match self {
                RequestKind::Advance | RequestKind::Reimbursement => "Pago",
                RequestKind::Airfare => "Emitido",
                RequestKind::Lodging => "Confirmado",
            },
            RequestStatus::AccountabilityReported => "Contas Prestadas",
            RequestStatus::Concluded => "Finalizado",
            RequestStatus::Rejected => "Recusado",
        }
    }

    /// Whether every expense item in this kind's accountability report
    /// must carry a receipt reference. Reimbursements are settled
    /// against already-incurred spend, so receipts are mandatory there.
    pub fn receipts_required(&self) -> bool {
        matches!(self, RequestKind::Reimbursement)
    }
}

/// Canonical status enumeration shared by all request kinds.
///
/// Statuses move monotonically through the fixed ordering:
/// Requested -> DirectorateApproved -> Paid -> AccountabilityReported -> Concluded,
/// with Rejected reachable only from the two pre-payment states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[sqlx(rename = "requested")]
    Requested,

    #[sqlx(rename = "directorate_approved")]
    DirectorateApproved,

    #[sqlx(rename = "paid")]
    Paid,

    #[sqlx(rename = "accountability_reported")]
    AccountabilityReported,

    #[sqlx(rename = "concluded")]
    Concluded,

    #[sqlx(rename = "rejected")]
    Rejected,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Requested => write!(f, "requested"),
            RequestStatus::DirectorateApproved => write!(f, "directorate_approved"),
            RequestStatus::Paid => write!(f, "paid"),
            RequestStatus::AccountabilityReported => write!(f, "accountability_reported"),
            RequestStatus::Concluded => write!(f, "concluded"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Expense request model, one row per request of any kind.
///
/// This struct maps to the `requests` table. Rows are never physically
/// deleted; terminal requests stay on record as Rejected or Concluded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Request {
    /// Unique identifier for the request
    pub id: Uuid,

    /// ID of the employee who submitted this request
    pub requester_id: Uuid,

    /// Which of the four workflows this request follows
    pub kind: RequestKind,

    /// Monetary amount requested
    pub amount: rust_decimal::Decimal,

    /// Trip destination
    pub destination: String,

    /// Business purpose of the expense
    pub purpose: String,

    /// First day of the trip, where applicable
    pub start_date: Option<NaiveDate>,

    /// Last day of the trip, where applicable
    pub end_date: Option<NaiveDate>,

    /// Canonical workflow status
    pub status: RequestStatus,

    /// First-stage approval flag
    pub approved_by_directorate: bool,

    /// Second-stage approval flag; implies directorate approval
    pub approved_by_finance: bool,

    /// How the payment was made (stamped at finance approval)
    pub payment_method: Option<String>,

    /// When the payment was made (stamped at finance approval)
    pub payment_date: Option<NaiveDate>,

    /// Timestamp when the request was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the request was last updated
    pub updated_at: DateTime<Utc>,
}

/// Request submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub amount: rust_decimal::Decimal,
    pub destination: String,
    pub purpose: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Finance approval payload carrying the payment metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceApproval {
    pub payment_method: String,
    pub payment_date: NaiveDate,
}

/// Request response (public representation)
///
/// Carries both the canonical status and the per-kind display label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestResponse {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub kind: RequestKind,
    pub amount: rust_decimal::Decimal,
    pub destination: String,
    pub purpose: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: RequestStatus,
    pub status_label: String,
    pub approved_by_directorate: bool,
    pub approved_by_finance: bool,
    pub payment_method: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Request> for RequestResponse {
    fn from(request: Request) -> Self {
        let status_label = request.kind.status_label(request.status).to_string();
        RequestResponse {
            id: request.id,
            requester_id: request.requester_id,
            kind: request.kind,
            amount: request.amount,
            destination: request.destination,
            purpose: request.purpose,
            start_date: request.start_date,
            end_date: request.end_date,
            status: request.status,
            status_label,
            approved_by_directorate: request.approved_by_directorate,
            approved_by_finance: request.approved_by_finance,
            payment_method: request.payment_method,
            payment_date: request.payment_date,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paid_label_varies_by_kind() {
        assert_eq!(
            RequestKind::Advance.status_label(RequestStatus::Paid),
            "Pago"
        );
        assert_eq!(
            RequestKind::Reimbursement.status_label(RequestStatus::Paid),
            "Pago"
        );
        assert_eq!(
            RequestKind::Airfare.status_label(RequestStatus::Paid),
            "Emitido"
        );
        assert_eq!(
            RequestKind::Lodging.status_label(RequestStatus::Paid),
            "Confirmado"
        );
    }

    #[test]
    fn test_concluded_label_is_shared() {
        for kind in [
            RequestKind::Advance,
            RequestKind::Reimbursement,
            RequestKind::Airfare,
            RequestKind::Lodging,
        ] {
            assert_eq!(kind.status_label(RequestStatus::Concluded), "Finalizado");
        }
    }

    #[test]
    fn test_receipts_mandatory_only_for_reimbursement() {
        assert!(RequestKind::Reimbursement.receipts_required());
        assert!(!RequestKind::Advance.receipts_required());
        assert!(!RequestKind::Airfare.receipts_required());
        assert!(!RequestKind::Lodging.receipts_required());
    }
}
