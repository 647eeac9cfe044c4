//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// `GET /health`. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /health/ready`. `503` while the database is unreachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
