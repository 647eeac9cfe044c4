//! Customer order history and cancellation.

use axum::{Json, extract::State};

use brandbazaar_core::dto::OrderView;
use brandbazaar_core::{OrderId, PageRequest, Paginated};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiPath, ApiQuery};
use crate::middleware::RequireAuth;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// `GET /api/orders`
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<Paginated<OrderView>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id, page)
        .await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}`. Other users' orders are indistinguishable from missing ones.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderView>> {
    let order = OrderRepository::new(state.pool())
        .get(id, Some(user.id))
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    Ok(Json(order))
}

/// `POST /api/orders/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderView>> {
    let order = OrderService::new(state.pool()).cancel(id, user.id).await?;
    Ok(Json(order))
}
