//! Session cart endpoints.
//!
//! Guests and signed-in users share the same session-backed cart; logging
//! out drops it with the rest of the session.

use axum::{Json, extract::State};
use tower_sessions::Session;
use tracing::instrument;

use brandbazaar_core::dto::{AddCartItem, Cart, CartView, UpdateCartItem};
use brandbazaar_core::{Validate, VariantId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::services::cart;
use crate::state::AppState;

/// Price the cart, dropping lines for variants that disappeared.
async fn render(state: &AppState, session: &Session, mut cart: Cart) -> Result<CartView> {
    let variants = ProductRepository::new(state.pool())
        .cart_variants(&cart.variant_ids())
        .await?;
    if cart::prune(&mut cart, &variants) {
        cart::save(session, &cart).await?;
    }
    Ok(cart::price(&cart, &variants))
}

/// `GET /api/cart`
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let current = cart::load(&session).await?;
    Ok(Json(render(&state, &session, current).await?))
}

/// `DELETE /api/cart`
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    cart::clear(&session).await?;
    Ok(Json(render(&state, &session, Cart::default()).await?))
}

/// `POST /api/cart/items`
#[instrument(skip(state, session))]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    ApiJson(input): ApiJson<AddCartItem>,
) -> Result<Json<CartView>> {
    input.validate()?;
    let variant = ProductRepository::new(state.pool())
        .variant(input.variant_id)
        .await?
        .filter(|v| v.is_listed)
        .ok_or_else(|| AppError::NotFound("Variant not found".to_string()))?;

    let stock = u32::try_from(variant.variant.stock).unwrap_or(0);
    let mut current = cart::load(&session).await?;
    if current.add(input.variant_id, input.quantity, stock) == 0 {
        return Err(AppError::Conflict(format!(
            "{} is out of stock",
            variant.variant.sku
        )));
    }
    cart::save(&session, &current).await?;

    Ok(Json(render(&state, &session, current).await?))
}

/// `PATCH /api/cart/items/{variantId}`
pub async fn update_item(
    State(state): State<AppState>,
    session: Session,
    ApiPath(variant_id): ApiPath<VariantId>,
    ApiJson(input): ApiJson<UpdateCartItem>,
) -> Result<Json<CartView>> {
    input.validate()?;
    let mut current = cart::load(&session).await?;
    if !current.set(variant_id, input.quantity) {
        return Err(AppError::NotFound("Item not in cart".to_string()));
    }
    cart::save(&session, &current).await?;

    Ok(Json(render(&state, &session, current).await?))
}

/// `DELETE /api/cart/items/{variantId}`
pub async fn remove_item(
    State(state): State<AppState>,
    session: Session,
    ApiPath(variant_id): ApiPath<VariantId>,
) -> Result<Json<CartView>> {
    let mut current = cart::load(&session).await?;
    if current.remove(variant_id) {
        cart::save(&session, &current).await?;
    }

    Ok(Json(render(&state, &session, current).await?))
}
