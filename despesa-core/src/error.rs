use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain error taxonomy for the expense-management core.
///
/// Every operation surfaces one of these synchronously; nothing is
/// retried internally. Persistence failures during a transactional
/// write abort the whole operation and surface as `Database`, which is
/// deliberately distinct from the four domain errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input; each entry names the offending field
    /// or item index so the caller can correct it.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The request's current status does not allow the attempted
    /// transition.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Uniqueness violation, e.g. a duplicate accountability report.
    #[error("{0}")]
    Conflict(String),

    /// The authenticated user's role does not allow the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Infrastructure failure in the persistence layer.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
            message: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<Vec<String>>,
        }

        let (status, error, message, details) = match self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "validation failed".to_string(),
                Some(errors),
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} not found", what),
                None,
            ),
            AppError::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, "invalid_transition", msg, None)
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            AppError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error".to_string(),
                    None,
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error,
                message,
                details,
            }),
        )
            .into_response()
    }
}
