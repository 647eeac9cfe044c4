//! Checkout: turns the session cart into a paid order.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use brandbazaar_core::dto::{Checkout, OrderView};

use crate::error::{Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::services::cart;
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// `POST /api/checkout`
#[instrument(skip(state, session, input), fields(user_id = %user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<Checkout>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let current = cart::load(&session).await?;
    let order = CheckoutService::new(state.pool())
        .place_order(user.id, &current, &input)
        .await?;

    cart::clear(&session).await?;
    let order_id = order.id.to_string();
    add_breadcrumb("checkout", "order placed", Some(&[("order_id", order_id.as_str())]));

    Ok((StatusCode::CREATED, Json(order)))
}
