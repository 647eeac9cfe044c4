//! Registration, login, and logout.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use brandbazaar_core::dto::{LoginUser, RegisterUser, UserView};

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// `POST /api/auth/register`
#[instrument(skip(state, session, input))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ApiJson(input): ApiJson<RegisterUser>,
) -> Result<(StatusCode, Json<UserView>)> {
    let user = AuthService::new(state.pool()).register(&input).await?;

    set_current_user(&session, &user.session_identity()).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("auth", "registered", None);

    Ok((StatusCode::CREATED, Json(user.view())))
}

/// `POST /api/auth/login`
#[instrument(skip(state, session, input))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(input): ApiJson<LoginUser>,
) -> Result<Json<UserView>> {
    let user = AuthService::new(state.pool()).login(&input).await?;

    set_current_user(&session, &user.session_identity()).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(user.view()))
}

/// `POST /api/auth/logout`
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me`
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<UserView>> {
    let user = AuthService::new(state.pool())
        .get_user(current.id)
        .await
        .map_err(|_| AppError::Unauthorized("Authentication required".to_string()))?;
    Ok(Json(user.view()))
}
