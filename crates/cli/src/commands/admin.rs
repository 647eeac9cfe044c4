//! Admin account management.
//!
//! The back office only admits accounts with the `admin` role, so the first
//! admin has to come from here.

use brandbazaar_core::dto::MIN_PASSWORD_LENGTH;
use brandbazaar_core::{Email, UserId, UserRole};
use brandbazaar_storefront::db::users::UserRepository;
use brandbazaar_storefront::services::auth::{AuthError, AuthService};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    #[error("No user with email: {0}")]
    UserNotFound(String),

    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error(transparent)]
    Auth(AuthError),

    #[error("Database error: {0}")]
    Repository(#[from] brandbazaar_storefront::db::RepositoryError),
}

/// Parse the arguments of `admin create` before touching the database.
fn check_new_admin(email: &str, password: &str) -> Result<Email, AdminError> {
    let email = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::PasswordTooShort);
    }
    Ok(email)
}

/// Create a new admin user.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<UserId, AdminError> {
    let email = check_new_admin(email, password)?;
    let pool = connect().await?;

    tracing::info!("Creating admin user: {}", email);
    let user = AuthService::new(&pool)
        .create_user(&email, name, password, UserRole::Admin)
        .await
        .map_err(|e| match e {
            AuthError::UserAlreadyExists => AdminError::UserExists(email.to_string()),
            other => AdminError::Auth(other),
        })?;

    tracing::info!("Admin user created successfully! ID: {}, Email: {}", user.id, user.email);
    Ok(user.id)
}

/// Promote an existing account to admin.
pub async fn promote(email: &str) -> Result<(), AdminError> {
    let parsed = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;
    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_email(&parsed)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(email.to_owned()))?;

    if user.role == UserRole::Admin {
        tracing::info!("{} is already an admin", user.email);
        return Ok(());
    }

    let user = users.set_role(user.id, UserRole::Admin).await?;
    tracing::info!("Promoted {} (ID: {}) to admin", user.email, user.id);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_email() {
        assert!(matches!(
            check_new_admin("not-an-email", "long enough password"),
            Err(AdminError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_rejects_short_password() {
        assert!(matches!(
            check_new_admin("admin@brandbazaar.dev", "short"),
            Err(AdminError::PasswordTooShort)
        ));
    }

    #[test]
    fn test_accepts_valid_arguments() {
        let email = check_new_admin("Admin@BrandBazaar.dev", "long enough password").unwrap();
        assert_eq!(email.as_str(), "admin@brandbazaar.dev");
    }
}
