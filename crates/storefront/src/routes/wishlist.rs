//! Wishlist endpoints. Adds and removes are idempotent.

use axum::{Json, extract::State, http::StatusCode};

use brandbazaar_core::ProductId;
use brandbazaar_core::dto::ProductSummary;

use crate::db::{ProductRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiPath;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// `GET /api/wishlist`
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<ProductSummary>>> {
    let products = WishlistRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(products))
}

/// `PUT /api/wishlist/{productId}`
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await?
        .filter(|p| p.is_listed())
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    WishlistRepository::new(state.pool())
        .add(user.id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/wishlist/{productId}`
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<StatusCode> {
    WishlistRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
