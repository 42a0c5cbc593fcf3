use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::lifecycle::machine::WorkflowTransition;
use crate::models::request::{FinanceApproval, Request, RequestKind, SubmitRequest};
use crate::notify;

pub(crate) const REQUEST_COLUMNS: &str = "id, requester_id, kind, amount, destination, purpose, \
     start_date, end_date, status, approved_by_directorate, approved_by_finance, \
     payment_method, payment_date, created_at, updated_at";

/// Validates a submission payload, collecting every invalid field.
fn validate_submission(payload: &SubmitRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if payload.destination.trim().is_empty() {
        errors.push("destination must not be empty".to_string());
    }
    if payload.purpose.trim().is_empty() {
        errors.push("purpose must not be empty".to_string());
    }
    if payload.amount <= Decimal::ZERO {
        errors.push("amount must be positive".to_string());
    }
    if let (Some(start), Some(end)) = (payload.start_date, payload.end_date) {
        if end < start {
            errors.push("end_date must not precede start_date".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Creates a new request with the initial `Requested` status.
///
/// # Errors
///
/// Returns `Validation` listing each invalid field, or `Database` if
/// the insert fails.
pub async fn submit(
    pool: &PgPool,
    requester_id: Uuid,
    kind: RequestKind,
    payload: SubmitRequest,
) -> Result<Request, AppError> {
    validate_submission(&payload)?;

    let sql = format!(
        "INSERT INTO requests (id, requester_id, kind, amount, destination, purpose, \
         start_date, end_date, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {}",
        REQUEST_COLUMNS
    );
    let request = sqlx::query_as::<_, Request>(&sql)
        .bind(Uuid::new_v4())
        .bind(requester_id)
        .bind(kind)
        .bind(payload.amount)
        .bind(payload.destination.trim())
        .bind(payload.purpose.trim())
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(WorkflowTransition::initial_status())
        .fetch_one(pool)
        .await?;

    info!(
        "Request {} ({}) submitted by {} for {}",
        request.id, kind, requester_id, request.amount
    );
    Ok(request)
}

/// Fetches a request row and locks it for the rest of the transaction.
///
/// Locking the row linearizes concurrent transitions: the second caller
/// blocks here, then observes the committed status and fails its
/// precondition check.
pub(crate) async fn fetch_for_update(
    tx: &mut Transaction<'_, Postgres>,
    kind: RequestKind,
    id: Uuid,
) -> Result<Request, AppError> {
    let sql = format!(
        "SELECT {} FROM requests WHERE id = $1 AND kind = $2 FOR UPDATE",
        REQUEST_COLUMNS
    );
    sqlx::query_as::<_, Request>(&sql)
        .bind(id)
        .bind(kind)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} request {}", kind, id)))
}

/// Applies a workflow transition to a single request.
///
/// The whole read-validate-write cycle runs in one transaction so that
/// at most one concurrent transition can succeed per request.
async fn apply_transition(
    pool: &PgPool,
    kind: RequestKind,
    id: Uuid,
    transition: WorkflowTransition,
    payment: Option<&FinanceApproval>,
) -> Result<Request, AppError> {
    let mut tx = pool.begin().await?;

    let request = fetch_for_update(&mut tx, kind, id).await?;
    let next = transition.apply(request.status)?;

    let updated = match transition {
        WorkflowTransition::DirectorateApproval => {
            let sql = format!(
                "UPDATE requests \
                 SET status = $2, approved_by_directorate = TRUE, updated_at = NOW() \
                 WHERE id = $1 \
                 RETURNING {}",
                REQUEST_COLUMNS
            );
            sqlx::query_as::<_, Request>(&sql)
                .bind(id)
                .bind(next)
                .fetch_one(&mut *tx)
                .await?
        }
        WorkflowTransition::FinanceApproval => {
            let payment = payment.ok_or_else(|| {
                AppError::Validation(vec!["payment details are required".to_string()])
            })?;
            let sql = format!(
                "UPDATE requests \
                 SET status = $2, approved_by_finance = TRUE, payment_method = $3, \
                     payment_date = $4, updated_at = NOW() \
                 WHERE id = $1 \
                 RETURNING {}",
                REQUEST_COLUMNS
            );
            sqlx::query_as::<_, Request>(&sql)
                .bind(id)
                .bind(next)
                .bind(payment.payment_method.trim())
                .bind(payment.payment_date)
                .fetch_one(&mut *tx)
                .await?
        }
        WorkflowTransition::Rejection | WorkflowTransition::Conclusion => {
            let sql = format!(
                "UPDATE requests SET status = $2, updated_at = NOW() \
                 WHERE id = $1 \
                 RETURNING {}",
                REQUEST_COLUMNS
            );
            sqlx::query_as::<_, Request>(&sql)
                .bind(id)
                .bind(next)
                .fetch_one(&mut *tx)
                .await?
        }
        // Accountability submission is applied by the reconciler inside
        // its own transaction, together with the report insert.
        WorkflowTransition::AccountabilitySubmission => {
            return Err(AppError::InvalidTransition(
                "accountability is submitted through the reconciler".to_string(),
            ));
        }
    };

    tx.commit().await?;

    info!(
        "Request {} ({}): {} -> {}",
        id, kind, request.status, updated.status
    );
    notify::dispatch_transition_notification(&updated);

    Ok(updated)
}

/// First-stage approval by a department director.
pub async fn approve_by_directorate(
    pool: &PgPool,
    kind: RequestKind,
    id: Uuid,
) -> Result<Request, AppError> {
    apply_transition(pool, kind, id, WorkflowTransition::DirectorateApproval, None).await
}

/// Second-stage approval by finance, stamping the payment metadata.
pub async fn approve_by_finance(
    pool: &PgPool,
    kind: RequestKind,
    id: Uuid,
    payment: FinanceApproval,
) -> Result<Request, AppError> {
    if payment.payment_method.trim().is_empty() {
        return Err(AppError::Validation(vec![
            "payment_method must not be empty".to_string(),
        ]));
    }
    apply_transition(
        pool,
        kind,
        id,
        WorkflowTransition::FinanceApproval,
        Some(&payment),
    )
    .await
}

/// Rejects a request. Legal only before payment.
pub async fn reject(pool: &PgPool, kind: RequestKind, id: Uuid) -> Result<Request, AppError> {
    apply_transition(pool, kind, id, WorkflowTransition::Rejection, None).await
}

/// Closes out a request whose accountability report has been filed.
pub async fn conclude(pool: &PgPool, kind: RequestKind, id: Uuid) -> Result<Request, AppError> {
    apply_transition(pool, kind, id, WorkflowTransition::Conclusion, None).await
}

/// Fetches a single request by kind and id.
pub async fn fetch(pool: &PgPool, kind: RequestKind, id: Uuid) -> Result<Request, AppError> {
    let sql = format!(
        "SELECT {} FROM requests WHERE id = $1 AND kind = $2",
        REQUEST_COLUMNS
    );
    sqlx::query_as::<_, Request>(&sql)
        .bind(id)
        .bind(kind)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} request {}", kind, id)))
}

/// Lists a requester's requests of one kind, newest first.
pub async fn list_for_requester(
    pool: &PgPool,
    kind: RequestKind,
    requester_id: Uuid,
) -> Result<Vec<Request>, AppError> {
    let sql = format!(
        "SELECT {} FROM requests \
         WHERE kind = $1 AND requester_id = $2 \
         ORDER BY created_at DESC",
        REQUEST_COLUMNS
    );
    let requests = sqlx::query_as::<_, Request>(&sql)
        .bind(kind)
        .bind(requester_id)
        .fetch_all(pool)
        .await?;
    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn valid_payload() -> SubmitRequest {
        SubmitRequest {
            amount: Decimal::new(100_000, 2),
            destination: "São Paulo".to_string(),
            purpose: "Client kickoff".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 10),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 14),
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        assert!(validate_submission(&valid_payload()).is_ok());
    }

    #[test]
    fn test_validation_lists_every_invalid_field() {
        let payload = SubmitRequest {
            amount: Decimal::ZERO,
            destination: "  ".to_string(),
            purpose: String::new(),
            start_date: None,
            end_date: None,
        };
        let err = validate_submission(&payload).unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.iter().any(|e| e.contains("destination")));
                assert!(errors.iter().any(|e| e.contains("purpose")));
                assert!(errors.iter().any(|e| e.contains("amount")));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_date_range_is_rejected() {
        let mut payload = valid_payload();
        payload.start_date = NaiveDate::from_ymd_opt(2024, 3, 14);
        payload.end_date = NaiveDate::from_ymd_opt(2024, 3, 10);
        let err = validate_submission(&payload).unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.contains("end_date")));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let mut payload = valid_payload();
        payload.amount = Decimal::new(-500, 2);
        assert!(validate_submission(&payload).is_err());
    }
}
