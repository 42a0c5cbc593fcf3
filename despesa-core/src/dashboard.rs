use axum::{extract::State, response::Json, Extension};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::{CurrentUser, Role};
use crate::error::AppError;
use crate::models::request::{RequestKind, RequestStatus};
use crate::AppState;

/// One dashboard row: total requested amount and request count for a
/// (kind, status) pair.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusTotal {
    pub kind: RequestKind,
    pub status: RequestStatus,
    pub total_amount: Decimal,
    pub request_count: i64,
}

/// Dashboard summary for the authenticated user.
///
/// The pending counters only appear for the role that can act on them.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub totals: Vec<StatusTotal>,

    /// Requests awaiting directorate approval (directors only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_directorate: Option<i64>,

    /// Requests awaiting finance approval (finance only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_finance: Option<i64>,
}

/// Dashboard summary endpoint handler.
///
/// Groups the caller's own requests by kind and status, and adds the
/// pending-approval counter matching the caller's role.
pub async fn summary_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<DashboardSummary>, AppError> {
    let totals = sqlx::query_as::<_, StatusTotal>(
        "SELECT kind, status, SUM(amount) AS total_amount, COUNT(*) AS request_count \
         FROM requests \
         WHERE requester_id = $1 \
         GROUP BY kind, status \
         ORDER BY kind, status",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    let pending_directorate = match user.role {
        Role::Director => Some(count_by_status(&state, RequestStatus::Requested).await?),
        _ => None,
    };
    let pending_finance = match user.role {
        Role::Finance => Some(count_by_status(&state, RequestStatus::DirectorateApproved).await?),
        _ => None,
    };

    Ok(Json(DashboardSummary {
        totals,
        pending_directorate,
        pending_finance,
    }))
}

async fn count_by_status(state: &AppState, status: RequestStatus) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests WHERE status = $1")
        .bind(status)
        .fetch_one(&state.db)
        .await?;
    Ok(count)
}
