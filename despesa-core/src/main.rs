use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use dotenv::dotenv;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use despesa_core::{auth, categories, dashboard, db, lifecycle, reconcile, AppState};

/// Health check endpoint.
///
/// Returns a simple JSON response indicating the server is running.
/// Useful for monitoring and load balancer health checks.
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "despesa-core",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Database health check endpoint.
///
/// Verifies that the database connection is working by executing
/// a simple query.
async fn db_health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| {
            tracing::error!("Database health check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "database": "connected"
    })))
}

/// Creates the main application router.
///
/// All `/api` routes sit behind the bearer-token middleware; the health
/// endpoints stay public.
fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/requests/:kind",
            post(lifecycle::handlers::submit_handler).get(lifecycle::handlers::list_handler),
        )
        .route("/requests/:kind/:id", get(lifecycle::handlers::get_handler))
        .route(
            "/requests/:kind/:id/approve/directorate",
            post(lifecycle::handlers::approve_directorate_handler),
        )
        .route(
            "/requests/:kind/:id/approve/finance",
            post(lifecycle::handlers::approve_finance_handler),
        )
        .route(
            "/requests/:kind/:id/reject",
            post(lifecycle::handlers::reject_handler),
        )
        .route(
            "/requests/:kind/:id/conclude",
            post(lifecycle::handlers::conclude_handler),
        )
        .route(
            "/requests/:kind/:id/accountability",
            post(reconcile::handlers::submit_accountability_handler)
                .get(reconcile::handlers::get_accountability_handler),
        )
        .route(
            "/categories",
            get(categories::list_handler).post(categories::create_handler),
        )
        .route("/dashboard/summary", get(dashboard::summary_handler))
        .route_layer(middleware::from_fn(auth::jwt_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(db_health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(LevelFilter::INFO.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    info!("Starting Despesa Core Server...");

    // Initialize database connection pool
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL not set"))?;
    let db_pool = db::create_pool(&database_url).await?;

    // Create application state
    let app_state = AppState { db: db_pool };

    // Create router
    let app = create_router(app_state);

    // Get server configuration
    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SERVER_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .map_err(|_| anyhow::anyhow!("Invalid SERVER_PORT"))?;

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}:{}: {}", host, port, e))?;

    info!("Server listening on {}:{}", host, port);

    // Start the server
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
