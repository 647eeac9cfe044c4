//! Signed-in account: profile, address book, and saved payment methods.

use axum::{Json, extract::State, http::StatusCode};

use brandbazaar_core::dto::{
    AddressView, CreateAddress, CreatePaymentMethod, PaymentMethodView, ProfileView,
    UpdateAddress, UpdateProfile,
};
use brandbazaar_core::{AddressId, PaymentMethodId, Validate};

use crate::db::{AddressRepository, PaymentMethodRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::state::AppState;

async fn profile_view(state: &AppState, user: &User) -> Result<ProfileView> {
    let counts = UserRepository::new(state.pool())
        .activity_counts(user.id)
        .await?;
    Ok(ProfileView {
        user: user.view(),
        last_seen_at: user.last_seen_at,
        order_count: counts.order_count,
        raffle_entry_count: counts.raffle_entry_count,
    })
}

fn not_found(what: &str) -> impl FnOnce(RepositoryError) -> AppError + '_ {
    move |e| match e {
        RepositoryError::NotFound => AppError::NotFound(format!("{what} not found")),
        other => other.into(),
    }
}

/// `GET /api/account`
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<ProfileView>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
    Ok(Json(profile_view(&state, &user).await?))
}

/// `PATCH /api/account`
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(input): ApiJson<UpdateProfile>,
) -> Result<Json<ProfileView>> {
    input.validate()?;
    let user = UserRepository::new(state.pool())
        .update_display_name(current.id, &input.display_name)
        .await?;
    Ok(Json(profile_view(&state, &user).await?))
}

// =============================================================================
// Addresses
// =============================================================================

/// `GET /api/account/addresses`
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<AddressView>>> {
    let addresses = AddressRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(addresses.iter().map(|a| a.view()).collect()))
}

/// `POST /api/account/addresses`
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<CreateAddress>,
) -> Result<(StatusCode, Json<AddressView>)> {
    input.validate()?;
    let address = AddressRepository::new(state.pool())
        .create(user.id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(address.view())))
}

/// `PATCH /api/account/addresses/{id}`
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<AddressId>,
    ApiJson(input): ApiJson<UpdateAddress>,
) -> Result<Json<AddressView>> {
    input.validate()?;
    let address = AddressRepository::new(state.pool())
        .update(user.id, id, &input)
        .await
        .map_err(not_found("Address"))?;
    Ok(Json(address.view()))
}

/// `DELETE /api/account/addresses/{id}`
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<AddressId>,
) -> Result<StatusCode> {
    AddressRepository::new(state.pool())
        .delete(user.id, id)
        .await
        .map_err(not_found("Address"))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Payment methods
// =============================================================================

/// `GET /api/account/payment-methods`
pub async fn payment_methods(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<PaymentMethodView>>> {
    let methods = PaymentMethodRepository::new(state.pool())
        .list(user.id)
        .await?;
    Ok(Json(methods.iter().map(|m| m.view()).collect()))
}

/// `POST /api/account/payment-methods`
pub async fn create_payment_method(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<CreatePaymentMethod>,
) -> Result<(StatusCode, Json<PaymentMethodView>)> {
    input.validate()?;
    let method = PaymentMethodRepository::new(state.pool())
        .create(user.id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(method.view())))
}

/// `POST /api/account/payment-methods/{id}/default`
pub async fn set_default_payment_method(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<PaymentMethodId>,
) -> Result<Json<PaymentMethodView>> {
    let method = PaymentMethodRepository::new(state.pool())
        .set_default(user.id, id)
        .await
        .map_err(not_found("Payment method"))?;
    Ok(Json(method.view()))
}

/// `DELETE /api/account/payment-methods/{id}`
pub async fn delete_payment_method(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<PaymentMethodId>,
) -> Result<StatusCode> {
    PaymentMethodRepository::new(state.pool())
        .delete(user.id, id)
        .await
        .map_err(not_found("Payment method"))?;
    Ok(StatusCode::NO_CONTENT)
}
