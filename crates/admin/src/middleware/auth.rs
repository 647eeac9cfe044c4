//! Authentication extractors for the back office.
//!
//! Every `/api/admin` route except login takes [`RequireAdmin`].

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use brandbazaar_core::UserRole;
use brandbazaar_storefront::db::UserRepository;

use crate::error::AppError;
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

fn login_required() -> AppError {
    AppError::Unauthorized("Admin login required".to_string())
}

/// Extractor that requires a signed-in admin. Rejects with `401` JSON.
///
/// The account is re-read on every request, so a demoted or deleted admin
/// loses access immediately and their session is cleared.
///
/// ```rust,ignore
/// async fn handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(login_required)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(login_required)?;

        let still_admin = UserRepository::new(state.pool())
            .get_by_id(admin.id)
            .await?
            .is_some_and(|user| user.role == UserRole::Admin);
        if !still_admin {
            tracing::warn!(user_id = %admin.id, "admin session revoked");
            clear_current_admin(&session).await?;
            return Err(login_required());
        }

        Ok(Self(admin))
    }
}

/// Store the signed-in admin, cycling the session ID against fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Drop the admin session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
