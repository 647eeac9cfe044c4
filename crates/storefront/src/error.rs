//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Responses are JSON: `{"error": "...", "details": [{"field", "message"}]}`,
//! with `details` present only for validation failures.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use brandbazaar_core::ValidationErrors;
use brandbazaar_core::raffle::{ClaimDenied, EntryDenied};

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::orders::OrderError;
use crate::services::raffle::RaffleError;

/// Application-level error type shared by the storefront and back office.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Raffle error: {0}")]
    Raffle(#[from] RaffleError),

    /// Request body failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Forbidden => StatusCode::FORBIDDEN,
                AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AuthError::Repository(e) => repository_status(e),
                AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => checkout_status(err),
            Self::Order(err) => match err {
                OrderError::NotFound => StatusCode::NOT_FOUND,
                OrderError::InvalidTransition { .. } => StatusCode::CONFLICT,
                OrderError::Repository(e) => repository_status(e),
            },
            Self::Raffle(err) => match err {
                RaffleError::NotFound => StatusCode::NOT_FOUND,
                RaffleError::Entry(EntryDenied::LevelTooLow { .. })
                | RaffleError::Claim(ClaimDenied::NotWinner) => StatusCode::FORBIDDEN,
                RaffleError::Entry(_)
                | RaffleError::Claim(_)
                | RaffleError::CannotDraw
                | RaffleError::NotDrawing
                | RaffleError::InvalidTransition { .. }
                | RaffleError::NotEditable(_)
                | RaffleError::NoProduct
                | RaffleError::OutOfStock { .. } => StatusCode::CONFLICT,
                RaffleError::VariantMismatch(_) => StatusCode::BAD_REQUEST,
                RaffleError::UserNotFound => StatusCode::UNAUTHORIZED,
                RaffleError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                RaffleError::Checkout(e) => checkout_status(e),
                RaffleError::Repository(e) => repository_status(e),
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Field failures to report, if this is a validation error.
    fn details(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors)
            | Self::Auth(AuthError::Validation(errors))
            | Self::Checkout(CheckoutError::Validation(errors))
            | Self::Raffle(
                RaffleError::Validation(errors)
                | RaffleError::Checkout(CheckoutError::Validation(errors)),
            ) => Some(errors),
            _ => None,
        }
    }

    /// Client-facing message. Never exposes internals.
    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            return "Internal server error".to_string();
        }
        match self {
            Self::Database(err) | Self::Auth(AuthError::Repository(err)) => match err {
                RepositoryError::NotFound => "Not found".to_string(),
                other => other.to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    "Invalid credentials".to_string()
                }
                AuthError::Validation(_) => "Validation failed".to_string(),
                other => other.to_string(),
            },
            Self::Checkout(err) => err.to_string(),
            Self::Order(err) => err.to_string(),
            Self::Raffle(err) => err.to_string(),
            Self::Validation(_) => "Validation failed".to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg)
            | Self::BadRequest(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn checkout_status(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
        CheckoutError::Unavailable(_) | CheckoutError::InsufficientStock { .. } => {
            StatusCode::CONFLICT
        }
        CheckoutError::AddressNotFound | CheckoutError::PaymentMethodNotFound => {
            StatusCode::NOT_FOUND
        }
        CheckoutError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutError::Repository(e) => repository_status(e),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = match self.details() {
            Some(details) => json!({ "error": self.public_message(), "details": details }),
            None => json!({ "error": self.public_message() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("variant_id", "…")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brandbazaar_core::LevelTier;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_json(err: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Validation(ValidationErrors::new())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_error_status_codes() {
        assert_eq!(
            get_status(CheckoutError::EmptyCart.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                CheckoutError::InsufficientStock {
                    sku: "AM90-42".to_string(),
                    available: 1
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(RaffleError::Entry(EntryDenied::Full).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(
                RaffleError::Entry(EntryDenied::LevelTooLow {
                    required: LevelTier::Sneakerhead,
                    actual: LevelTier::Hobbyist,
                })
                .into()
            ),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(RepositoryError::Conflict("dup".to_string()).into()),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "is required");
        errors.add("password", "must be at least 8 characters");

        let body = body_json(AppError::Validation(errors)).await;
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"][0]["field"], "email");
        assert_eq!(body["details"][1]["field"], "password");
    }

    #[tokio::test]
    async fn test_server_errors_hide_internals() {
        let body = body_json(AppError::Internal("connection refused at 10.0.0.3".to_string())).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_login_failure_is_generic() {
        let body = body_json(AuthError::InvalidCredentials.into()).await;
        assert_eq!(body["error"], "Invalid credentials");
    }
}
