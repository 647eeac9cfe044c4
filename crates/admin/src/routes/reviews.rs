//! Review moderation.

use axum::{Json, extract::State, http::StatusCode};

use brandbazaar_core::dto::ReviewView;
use brandbazaar_core::{PageRequest, Paginated, ReviewId};
use brandbazaar_storefront::db::ReviewRepository;
use brandbazaar_storefront::extract::{ApiPath, ApiQuery};

use crate::error::{Result, not_found};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// `GET /api/admin/reviews`, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<Paginated<ReviewView>>> {
    let reviews = ReviewRepository::new(state.pool()).list_recent(page).await?;
    Ok(Json(reviews.map(|r| r.view())))
}

/// `DELETE /api/admin/reviews/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ReviewId>,
) -> Result<StatusCode> {
    ReviewRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found("Review"))?;
    tracing::info!(review_id = %id, admin_id = %admin.id, "review removed");
    Ok(StatusCode::NO_CONTENT)
}
