use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::lifecycle::machine::WorkflowTransition;
use crate::lifecycle::service::{fetch_for_update, REQUEST_COLUMNS};
use crate::models::accountability::{
    AccountabilityReport, AccountabilityResponse, ExpenseItem, SubmitAccountability,
};
use crate::models::request::{Request, RequestKind};
use crate::notify;
use crate::reconcile::settlement;

const REPORT_COLUMNS: &str =
    "id, request_id, total_spent, amount_to_return, amount_to_bill, notes, created_at";

const ITEM_COLUMNS: &str =
    "id, report_id, position, category, description, amount, expense_date, receipt_ref";

/// Settles a paid request against the employee's itemized spend.
///
/// The report, its items, the category registrations and the request's
/// status change are written in one transaction; a crash mid-write
/// never leaves a partial report behind.
///
/// # Errors
///
/// - `NotFound` if the request does not exist under this kind
/// - `Forbidden` if the caller is not the requester
/// - `Conflict` if a report already exists for this request
/// - `InvalidTransition` if the request has not been paid yet
/// - `Validation` naming the index of each invalid item
pub async fn reconcile(
    pool: &PgPool,
    kind: RequestKind,
    id: Uuid,
    requester_id: Uuid,
    payload: SubmitAccountability,
) -> Result<AccountabilityResponse, AppError> {
    settlement::validate_items(&payload.items, kind.receipts_required())?;

    let mut tx = pool.begin().await?;

    let request = fetch_for_update(&mut tx, kind, id).await?;
    if request.requester_id != requester_id {
        return Err(AppError::Forbidden(
            "only the requester may file accountability".to_string(),
        ));
    }

    // A settled request must report the duplicate, not an invalid
    // transition, so the uniqueness check comes first.
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM accountability_reports WHERE request_id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "an accountability report already exists for request {}",
            id
        )));
    }

    let next = WorkflowTransition::AccountabilitySubmission.apply(request.status)?;

    let total = settlement::total_spent(&payload.items);
    let settlement = settlement::settle(request.amount, total);

    let sql = format!(
        "INSERT INTO accountability_reports \
         (id, request_id, total_spent, amount_to_return, amount_to_bill, notes) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {}",
        REPORT_COLUMNS
    );
    let report = sqlx::query_as::<_, AccountabilityReport>(&sql)
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(settlement.total_spent)
        .bind(settlement.amount_to_return)
        .bind(settlement.amount_to_bill)
        .bind(payload.notes.as_deref())
        .fetch_one(&mut *tx)
        .await?;

    let item_sql = format!(
        "INSERT INTO expense_items \
         (id, report_id, position, category, description, amount, expense_date, receipt_ref) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {}",
        ITEM_COLUMNS
    );
    let mut items = Vec::with_capacity(payload.items.len());
    for (index, item) in payload.items.iter().enumerate() {
        let row = sqlx::query_as::<_, ExpenseItem>(&item_sql)
            .bind(Uuid::new_v4())
            .bind(report.id)
            .bind(index as i32)
            .bind(item.category.trim())
            .bind(item.description.trim())
            .bind(item.amount)
            .bind(item.expense_date)
            .bind(item.receipt_ref.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        // Register unseen categories in the open vocabulary.
        sqlx::query("INSERT INTO expense_categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(item.category.trim())
            .execute(&mut *tx)
            .await?;

        items.push(row);
    }

    let update_sql = format!(
        "UPDATE requests SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
        REQUEST_COLUMNS
    );
    let updated = sqlx::query_as::<_, Request>(&update_sql)
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "Request {} ({}) reconciled: spent {}, return {}, bill {}",
        id, kind, settlement.total_spent, settlement.amount_to_return, settlement.amount_to_bill
    );
    notify::dispatch_transition_notification(&updated);

    Ok(AccountabilityResponse { report, items })
}

/// Fetches a request's accountability report with its ordered items.
pub async fn fetch_report(
    pool: &PgPool,
    kind: RequestKind,
    id: Uuid,
) -> Result<AccountabilityResponse, AppError> {
    // Resolve through the request so a wrong kind reports NotFound.
    let request_sql = format!(
        "SELECT {} FROM requests WHERE id = $1 AND kind = $2",
        REQUEST_COLUMNS
    );
    let request = sqlx::query_as::<_, Request>(&request_sql)
        .bind(id)
        .bind(kind)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} request {}", kind, id)))?;

    let report_sql = format!(
        "SELECT {} FROM accountability_reports WHERE request_id = $1",
        REPORT_COLUMNS
    );
    let report = sqlx::query_as::<_, AccountabilityReport>(&report_sql)
        .bind(request.id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("accountability report for request {}", id))
        })?;

    let items_sql = format!(
        "SELECT {} FROM expense_items WHERE report_id = $1 ORDER BY position",
        ITEM_COLUMNS
    );
    let items = sqlx::query_as::<_, ExpenseItem>(&items_sql)
        .bind(report.id)
        .fetch_all(pool)
        .await?;

    Ok(AccountabilityResponse { report, items })
}
