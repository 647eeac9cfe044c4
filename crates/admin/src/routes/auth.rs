//! Back-office login. Only accounts with the `admin` role get in.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use brandbazaar_core::UserRole;
use brandbazaar_core::dto::{AdminUserView, LoginUser};
use brandbazaar_storefront::extract::ApiJson;
use brandbazaar_storefront::services::auth::AuthService;

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdmin, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// `POST /api/admin/auth/login`
#[instrument(skip(state, session, input))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(input): ApiJson<LoginUser>,
) -> Result<Json<AdminUserView>> {
    let user = AuthService::new(state.pool())
        .login_with_role(&input, UserRole::Admin)
        .await?;

    set_current_admin(&session, &CurrentAdmin::from(&user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("auth", "admin logged in", None);
    tracing::info!(user_id = %user.id, "admin logged in");

    Ok(Json(user.admin_view()))
}

/// `POST /api/admin/auth/logout`
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/admin/auth/me`
pub async fn me(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<AdminUserView>> {
    let user = AuthService::new(state.pool())
        .get_user(admin.id)
        .await
        .map_err(|_| AppError::Unauthorized("Admin login required".to_string()))?;
    Ok(Json(user.admin_view()))
}
