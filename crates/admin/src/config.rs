//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL for the back office
//! - `ADMIN_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `RAFFLE_SWEEP_INTERVAL_SECS` - Winner deadline sweep period (default: 60, `0` disables)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//!
//! Parsing helpers and secret validation are shared with the storefront.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;

pub use brandbazaar_storefront::config::{ConfigError, SentryConfig};
use brandbazaar_storefront::config::{
    cookie_key, get_base_url, get_database_url, get_validated_secret, parse_env,
    validate_session_secret,
};
use tower_sessions::cookie::Key;

/// Back-office application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL; `https://` enables secure cookies
    pub base_url: String,
    pub session_secret: SecretString,
    /// `None` when the background sweep is disabled
    pub raffle_sweep_interval: Option<Duration>,
    pub sentry: SentryConfig,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = parse_env("ADMIN_HOST", "127.0.0.1")?;
        let port = parse_env("ADMIN_PORT", "3001")?;
        let base_url = get_base_url("ADMIN_BASE_URL")?;
        let session_secret = get_validated_secret("ADMIN_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "ADMIN_SESSION_SECRET")?;
        let raffle_sweep_interval =
            sweep_interval(parse_env::<u64>("RAFFLE_SWEEP_INTERVAL_SECS", "60")?);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            raffle_sweep_interval,
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Session cookie signing key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InsecureSecret` if key derivation fails.
    pub fn cookie_key(&self) -> Result<Key, ConfigError> {
        cookie_key(&self.session_secret, "ADMIN_SESSION_SECRET")
    }
}

/// Zero seconds disables the sweep.
const fn sweep_interval(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_interval_zero_disables() {
        assert_eq!(sweep_interval(0), None);
    }

    #[test]
    fn test_sweep_interval_seconds() {
        assert_eq!(sweep_interval(60), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_is_secure_follows_scheme() {
        let mut config = AdminConfig {
            database_url: SecretString::from("postgres://localhost/bb"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            base_url: "https://admin.brandbazaar.dev".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            raffle_sweep_interval: None,
            sentry: SentryConfig::default(),
        };
        assert!(config.is_secure());
        assert_eq!(config.socket_addr().port(), 3001);

        config.base_url = "http://localhost:3001".to_string();
        assert!(!config.is_secure());
    }
}
