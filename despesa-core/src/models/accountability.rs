use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Accountability report (prestação de contas) settling a paid request
/// against the employee's actual spend.
///
/// This struct maps to the `accountability_reports` table. Exactly one
/// report may exist per request, enforced by a unique constraint on
/// `request_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccountabilityReport {
    /// Unique identifier for the report
    pub id: Uuid,

    /// The request this report settles (one-to-one)
    pub request_id: Uuid,

    /// Sum of all expense item amounts
    pub total_spent: rust_decimal::Decimal,

    /// Money the employee owes back (advance exceeded actual spend)
    pub amount_to_return: rust_decimal::Decimal,

    /// Additional money owed to the employee (spend exceeded advance)
    pub amount_to_bill: rust_decimal::Decimal,

    /// Free-text notes from the employee
    pub notes: Option<String>,

    /// Timestamp when the report was submitted
    pub created_at: DateTime<Utc>,
}

/// Single expense line inside an accountability report.
///
/// Items are immutable once submitted; there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpenseItem {
    /// Unique identifier for the item
    pub id: Uuid,

    /// The report this item belongs to
    pub report_id: Uuid,

    /// Position within the report, preserving submission order
    pub position: i32,

    /// Expense category (open vocabulary, non-empty)
    pub category: String,

    /// What the money was spent on
    pub description: String,

    /// Amount spent (positive)
    pub amount: rust_decimal::Decimal,

    /// Date the expense was incurred
    pub expense_date: NaiveDate,

    /// Opaque reference into external object storage for the receipt.
    /// Stored as-is; the object's existence is never validated here.
    pub receipt_ref: Option<String>,
}

/// One expense line as submitted by the employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpenseItem {
    pub category: String,
    pub description: String,
    pub amount: rust_decimal::Decimal,
    pub expense_date: NaiveDate,
    pub receipt_ref: Option<String>,
}

/// Accountability submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAccountability {
    pub items: Vec<NewExpenseItem>,
    pub notes: Option<String>,
}

/// Report response carrying the report and its ordered items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountabilityResponse {
    pub report: AccountabilityReport,
    pub items: Vec<ExpenseItem>,
}
