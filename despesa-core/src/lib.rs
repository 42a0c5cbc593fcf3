use sqlx::PgPool;

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod reconcile;

/// Application state containing shared resources.
///
/// This struct holds the database connection pool and other
/// shared state that needs to be accessible to route handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub db: PgPool,
}
