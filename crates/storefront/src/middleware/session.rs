//! Session middleware configuration.
//!
//! Sessions live in `PostgreSQL` (`tower_sessions.session`) and carry the
//! signed-in user, the cart, and the recently-viewed list.

use sqlx::PgPool;
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::{ConfigError, StorefrontConfig};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bb_session";

/// Inactivity expiry (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with the `PostgreSQL` store.
///
/// # Errors
///
/// Returns `ConfigError` if the cookie signing key can't be derived.
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<PostgresStore, SignedCookie>, ConfigError> {
    let key = config.cookie_key()?;
    Ok(session_layer(PostgresStore::new(pool.clone()), config.is_secure(), key))
}

/// Storefront cookie settings over any store.
#[must_use]
pub fn session_layer<S: SessionStore>(store: S, secure: bool, key: Key) -> SessionManagerLayer<S, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_signed(key)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, header};
    use axum::routing::get;
    use secrecy::SecretString;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session};

    use super::*;
    use crate::config::cookie_key;

    async fn visits(session: Session) -> String {
        let count = session.get::<u32>("visits").await.unwrap().unwrap_or(0) + 1;
        session.insert("visits", count).await.unwrap();
        count.to_string()
    }

    fn router(store: MemoryStore, secret: &str) -> Router {
        let key = cookie_key(&SecretString::from(secret.to_string()), "TEST_SESSION").unwrap();
        Router::new()
            .route("/", get(visits))
            .layer(session_layer(store, false, key))
    }

    async fn visit(router: Router, cookie: Option<&str>) -> (String, Option<String>) {
        let mut request = Request::builder().uri("/");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = router.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (String::from_utf8(bytes.to_vec()).unwrap(), set_cookie)
    }

    #[tokio::test]
    async fn test_signed_cookie_only_accepted_with_same_key() {
        let store = MemoryStore::default();
        let secret = "k7#Qw9!zR2@vL5$mN8^pX3&bT6*cY1%d";

        let (first, cookie) = visit(router(store.clone(), secret), None).await;
        assert_eq!(first, "1");
        let cookie = cookie.unwrap();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));

        let (second, _) = visit(router(store.clone(), secret), Some(&cookie)).await;
        assert_eq!(second, "2");

        let other = "Z4!hJ8@sD2#fG6$kL0%qW3^eR7&tY1*u";
        let (rekeyed, _) = visit(router(store.clone(), other), Some(&cookie)).await;
        assert_eq!(rekeyed, "1");

        // Alter the session id while keeping the old signature.
        let mut forged = cookie.clone();
        let last = forged.pop().unwrap();
        forged.push(if last == 'A' { 'B' } else { 'A' });
        let (tampered, _) = visit(router(store, secret), Some(&forged)).await;
        assert_eq!(tampered, "1");
    }
}
