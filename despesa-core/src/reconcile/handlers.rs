use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use uuid::Uuid;

use crate::auth::{CurrentUser, Role};
use crate::error::AppError;
use crate::models::accountability::{AccountabilityResponse, SubmitAccountability};
use crate::models::request::RequestKind;
use crate::reconcile::service;
use crate::AppState;

/// Accountability submission endpoint handler.
///
/// Handles POST requests to `/api/requests/:kind/:id/accountability`,
/// settling a paid request against the submitted expense items.
pub async fn submit_accountability_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((kind, id)): Path<(RequestKind, Uuid)>,
    Json(payload): Json<SubmitAccountability>,
) -> Result<(StatusCode, Json<AccountabilityResponse>), AppError> {
    let response = service::reconcile(&state.db, kind, id, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Accountability report endpoint handler.
///
/// Visible to the requester themselves and to approver roles.
pub async fn get_accountability_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((kind, id)): Path<(RequestKind, Uuid)>,
) -> Result<Json<AccountabilityResponse>, AppError> {
    let request = crate::lifecycle::service::fetch(&state.db, kind, id).await?;
    if request.requester_id != user.id && user.role == Role::Employee {
        return Err(AppError::Forbidden(
            "only the requester or an approver may view this report".to_string(),
        ));
    }
    let response = service::fetch_report(&state.db, kind, id).await?;
    Ok(Json(response))
}
