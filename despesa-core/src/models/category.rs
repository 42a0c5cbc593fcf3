use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Expense category in the global, runtime-growable vocabulary.
///
/// This struct maps to the `expense_categories` table. Users may add
/// categories at any time; validation only ever requires a non-empty
/// name, never membership in a fixed enum.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Category name (primary key)
    pub name: String,

    /// Timestamp when the category was first registered
    pub created_at: DateTime<Utc>,
}

/// Category creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
}
