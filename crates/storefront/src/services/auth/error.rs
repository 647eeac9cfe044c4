//! Authentication error types.

use thiserror::Error;

use brandbazaar_core::ValidationErrors;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request body failed validation.
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),

    /// Wrong password, unknown email, or malformed email on login.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Email already registered.
    #[error("an account with this email already exists")]
    UserAlreadyExists,

    /// Account lacks the role required for this surface.
    #[error("insufficient role")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
