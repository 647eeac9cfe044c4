//! Session middleware configuration for the back office.
//!
//! Same `PostgreSQL` store as the storefront, with a separate cookie and
//! stricter settings (`SameSite=Strict`, 24 hour expiry).

use sqlx::PgPool;
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::{AdminConfig, ConfigError};

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "bb_admin_session";

/// Session expiry time in seconds (24 hours - stricter than storefront).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with the `PostgreSQL` store.
///
/// # Errors
///
/// Returns `ConfigError` if the cookie signing key can't be derived.
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> Result<SessionManagerLayer<PostgresStore, SignedCookie>, ConfigError> {
    let key = config.cookie_key()?;
    Ok(session_layer(PostgresStore::new(pool.clone()), config.is_secure(), key))
}

/// Admin cookie settings over any store.
#[must_use]
pub fn session_layer<S: SessionStore>(store: S, secure: bool, key: Key) -> SessionManagerLayer<S, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_signed(key)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(secure)
        // SameSite=Strict for admin (stricter than storefront's Lax)
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
