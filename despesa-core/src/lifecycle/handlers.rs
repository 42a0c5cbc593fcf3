use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use uuid::Uuid;

use crate::auth::{CurrentUser, Role};
use crate::error::AppError;
use crate::lifecycle::service;
use crate::models::request::{FinanceApproval, RequestKind, RequestResponse, SubmitRequest};
use crate::AppState;

/// Submit endpoint handler.
///
/// Handles POST requests to `/api/requests/:kind`, creating a request
/// with the initial `Requested` status for the authenticated employee.
pub async fn submit_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(kind): Path<RequestKind>,
    Json(payload): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<RequestResponse>), AppError> {
    let request = service::submit(&state.db, user.id, kind, payload).await?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

/// List endpoint handler returning the caller's requests, newest first.
pub async fn list_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(kind): Path<RequestKind>,
) -> Result<Json<Vec<RequestResponse>>, AppError> {
    let requests = service::list_for_requester(&state.db, kind, user.id).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Single-request endpoint handler.
///
/// Visible to the requester themselves and to approver roles.
pub async fn get_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((kind, id)): Path<(RequestKind, Uuid)>,
) -> Result<Json<RequestResponse>, AppError> {
    let request = service::fetch(&state.db, kind, id).await?;
    if request.requester_id != user.id && user.role == Role::Employee {
        return Err(AppError::Forbidden(
            "only the requester or an approver may view this request".to_string(),
        ));
    }
    Ok(Json(request.into()))
}

/// Directorate approval endpoint handler. Requires the director role.
pub async fn approve_directorate_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((kind, id)): Path<(RequestKind, Uuid)>,
) -> Result<Json<RequestResponse>, AppError> {
    user.require_role(Role::Director)?;
    let request = service::approve_by_directorate(&state.db, kind, id).await?;
    Ok(Json(request.into()))
}

/// Finance approval endpoint handler. Requires the finance role and
/// carries the payment metadata.
pub async fn approve_finance_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((kind, id)): Path<(RequestKind, Uuid)>,
    Json(payment): Json<FinanceApproval>,
) -> Result<Json<RequestResponse>, AppError> {
    user.require_role(Role::Finance)?;
    let request = service::approve_by_finance(&state.db, kind, id, payment).await?;
    Ok(Json(request.into()))
}

/// Rejection endpoint handler. Directors and finance staff may reject.
pub async fn reject_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((kind, id)): Path<(RequestKind, Uuid)>,
) -> Result<Json<RequestResponse>, AppError> {
    if !matches!(user.role, Role::Director | Role::Finance) {
        return Err(AppError::Forbidden(
            "rejection requires the Director or Finance role".to_string(),
        ));
    }
    let request = service::reject(&state.db, kind, id).await?;
    Ok(Json(request.into()))
}

/// Conclusion endpoint handler. Requires the finance role.
pub async fn conclude_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((kind, id)): Path<(RequestKind, Uuid)>,
) -> Result<Json<RequestResponse>, AppError> {
    user.require_role(Role::Finance)?;
    let request = service::conclude(&state.db, kind, id).await?;
    Ok(Json(request.into()))
}
