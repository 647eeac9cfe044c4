//! Authentication service.
//!
//! Email + password accounts with Argon2id hashes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use brandbazaar_core::dto::{LoginUser, RegisterUser};
use brandbazaar_core::{Email, UserRole, Validate};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the payload is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, input: &RegisterUser) -> Result<User, AuthError> {
        input.validate()?;
        let email = parse_email(&input.email)?;
        self.create_user(&email, &input.display_name, &input.password, UserRole::Customer)
            .await
    }

    /// Create an account with an explicit role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn create_user(
        &self,
        email: &Email,
        display_name: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(email, display_name, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %role, "account created");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, input: &LoginUser) -> Result<User, AuthError> {
        let email = Email::parse(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&input.password, &password_hash)?;

        Ok(user)
    }

    /// Login restricted to accounts holding `role`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on bad credentials and
    /// `AuthError::Forbidden` when the account has another role.
    pub async fn login_with_role(
        &self,
        input: &LoginUser,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let user = self.login(input).await?;
        if user.role != role {
            tracing::warn!(user_id = %user.id, "login refused: role {} lacks access", user.role);
            return Err(AuthError::Forbidden);
        }
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    pub async fn get_user(&self, id: brandbazaar_core::UserId) -> Result<User, AuthError> {
        self.users.get_by_id(id).await?.ok_or(AuthError::UserNotFound)
    }
}

fn parse_email(raw: &str) -> Result<Email, AuthError> {
    Email::parse(raw).map_err(|e| {
        let mut errors = brandbazaar_core::ValidationErrors::new();
        errors.add("email", e.to_string());
        AuthError::Validation(errors)
    })
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
