//! Unified error handling for the back office.
//!
//! The admin API answers with the same JSON error shape as the storefront,
//! so it shares the storefront's `AppError` and only adds helpers for
//! errors specific to back-office writes.

pub use brandbazaar_storefront::error::{
    AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user,
};

use brandbazaar_storefront::db::RepositoryError;

/// Turn a missing row into a `404` naming `what`.
pub fn not_found(what: &'static str) -> impl Fn(RepositoryError) -> AppError {
    move |e| match e {
        RepositoryError::NotFound => AppError::NotFound(format!("{what} not found")),
        other => AppError::Database(other),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_not_found_names_the_resource() {
        let err = not_found("Product")(RepositoryError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Not found: Product not found");
    }

    #[test]
    fn test_not_found_passes_other_errors_through() {
        let err = not_found("Product")(RepositoryError::Conflict("sku already exists".into()));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
