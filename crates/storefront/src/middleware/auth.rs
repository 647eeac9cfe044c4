//! Authentication extractors.
//!
//! Handlers take [`RequireAuth`] to demand a signed-in user, or
//! [`OptionalAuth`] when guests are welcome too.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in user. Rejects with `401` JSON.
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the signed-in user, cycling the session ID against fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Drop the whole session (logout). The guest cart goes with it.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
