//! Order management.

use axum::{Json, extract::State};
use tracing::instrument;

use brandbazaar_core::dto::{OrderFilter, OrderView, UpdateOrderStatus};
use brandbazaar_core::{OrderId, Paginated};
use brandbazaar_storefront::db::OrderRepository;
use brandbazaar_storefront::extract::{ApiJson, ApiPath, ApiQuery};
use brandbazaar_storefront::services::orders::OrderService;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// `GET /api/admin/orders`
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiQuery(filter): ApiQuery<OrderFilter>,
) -> Result<Json<Paginated<OrderView>>> {
    Ok(Json(OrderRepository::new(state.pool()).list(&filter).await?))
}

/// `GET /api/admin/orders/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderView>> {
    OrderRepository::new(state.pool())
        .get(id, None)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

/// `POST /api/admin/orders/{id}/status`
///
/// Cancelling restocks the lines and takes back the order's XP.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(input): ApiJson<UpdateOrderStatus>,
) -> Result<Json<OrderView>> {
    let order = OrderService::new(state.pool())
        .change_status(id, None, input.status)
        .await?;
    Ok(Json(order))
}
