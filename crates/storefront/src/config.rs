//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront API
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CATALOG_CACHE_TTL_SECS` - Product detail cache lifetime (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use argon2::Argon2;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tower_sessions::cookie::Key;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Fixed salt for stretching a session secret into a cookie signing key.
const COOKIE_KEY_SALT: &[u8] = b"brandbazaar-session-cookie";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Error tracking settings shared by both binaries.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl SentryConfig {
    /// Load `SENTRY_*` variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a sample rate is not a number in `0.0..=1.0`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN").filter(|s| !s.is_empty()),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_sample_rate("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_sample_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL; `https://` enables secure cookies
    pub base_url: String,
    /// Signs the session cookie; see [`cookie_key`]
    pub session_secret: SecretString,
    /// How long product detail responses stay cached
    pub catalog_cache_ttl: Duration,
    pub sentry: SentryConfig,
}

impl StorefrontConfig {
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

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_base_url("STOREFRONT_BASE_URL")?;
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;
        let catalog_cache_ttl =
            Duration::from_secs(parse_env::<u64>("CATALOG_CACHE_TTL_SECS", "60")?);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            catalog_cache_ttl,
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
        cookie_key(&self.session_secret, "STOREFRONT_SESSION_SECRET")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if unset.
pub fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` naming `primary_key` if neither is set.
pub fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
#[must_use]
pub fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value does not parse.
pub fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get a required base URL and check it parses.
///
/// # Errors
///
/// Returns `ConfigError` if unset or not an absolute http(s) URL.
pub fn get_base_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    let url = url::Url::parse(&value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(value.trim_end_matches('/').to_string())
}

fn parse_sample_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

/// Validate that a session secret meets minimum length requirements.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if shorter than 32 characters.
pub fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Stretch a session secret into the 64-byte key that signs session cookies.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if key derivation rejects the secret.
pub fn cookie_key(secret: &SecretString, var_name: &str) -> Result<Key, ConfigError> {
    let mut bytes = [0u8; 64];
    Argon2::default()
        .hash_password_into(secret.expose_secret().as_bytes(), COOKIE_KEY_SALT, &mut bytes)
        .map_err(|e| ConfigError::InsecureSecret(var_name.to_string(), e.to_string()))?;
    Ok(Key::from(&bytes))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
///
/// # Errors
///
/// Returns `ConfigError` if unset, a placeholder, or low entropy.
pub fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-session-key-here", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength(&"a".repeat(33), "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_cookie_key_is_stable_per_secret() {
        let a = cookie_key(&SecretString::from("a".repeat(32)), "TEST_SESSION").unwrap();
        let again = cookie_key(&SecretString::from("a".repeat(32)), "TEST_SESSION").unwrap();
        let b = cookie_key(&SecretString::from("b".repeat(32)), "TEST_SESSION").unwrap();
        assert_eq!(a.master(), again.master());
        assert_ne!(a.master(), b.master());
    }

    #[test]
    fn test_validate_session_secret_length() {
        assert!(validate_session_secret(&SecretString::from("short"), "TEST_SESSION").is_err());
        assert!(validate_session_secret(&SecretString::from("a".repeat(32)), "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_socket_addr_and_secure_flag() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://shop.brandbazaar.dev".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            catalog_cache_ttl: Duration::from_secs(60),
            sentry: SentryConfig::default(),
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(config.is_secure());
    }

    #[test]
    fn test_config_debug_redacts_secrets() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://bb:hunter2@db/bb"),
            host: "0.0.0.0".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("super-private-session-value-0123456789"),
            catalog_cache_ttl: Duration::from_secs(60),
            sentry: SentryConfig::default(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("localhost:3000"));
        assert!(!debug_output.contains("hunter2"));
        assert!(!debug_output.contains("super-private-session-value"));
    }
}
