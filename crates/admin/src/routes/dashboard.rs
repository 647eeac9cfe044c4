//! Dashboard overview.

use axum::{Json, extract::State};

use brandbazaar_core::dto::DashboardStats;

use crate::db::DashboardRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// `GET /api/admin/dashboard`
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<DashboardStats>> {
    Ok(Json(DashboardRepository::new(state.pool()).stats().await?))
}
