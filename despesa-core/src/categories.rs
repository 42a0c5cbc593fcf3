use axum::{extract::State, http::StatusCode, response::Json};

use crate::error::AppError;
use crate::models::category::{Category, CreateCategory};
use crate::AppState;

/// Category list endpoint handler.
///
/// Returns the full vocabulary, alphabetically.
pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT name, created_at FROM expense_categories ORDER BY name",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(categories))
}

/// Category creation endpoint handler.
///
/// The vocabulary is open: any authenticated user may add a category,
/// and re-adding an existing one is a no-op success.
pub async fn create_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(vec![
            "name must not be empty".to_string(),
        ]));
    }

    sqlx::query("INSERT INTO expense_categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
        .bind(name)
        .execute(&state.db)
        .await?;

    let category = sqlx::query_as::<_, Category>(
        "SELECT name, created_at FROM expense_categories WHERE name = $1",
    )
    .bind(name)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}
