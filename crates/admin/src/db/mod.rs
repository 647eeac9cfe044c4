//! Back-office database operations.
//!
//! The back office shares the storefront's `PostgreSQL` database and its
//! repositories. Queries only the back office runs live here: catalog
//! writes, raffle setup, user search, and dashboard aggregates.
//!
//! # Migrations
//!
//! Migrations live in the workspace `migrations/` directory and run via:
//! ```bash
//! cargo run -p brandbazaar-cli -- migrate
//! ```

pub mod dashboard;
pub mod products;
pub mod raffles;
pub mod users;

pub use brandbazaar_storefront::db::{RepositoryError, create_pool};

pub use dashboard::DashboardRepository;
pub use products::CatalogAdminRepository;
pub use raffles::RaffleAdminRepository;
pub use users::UserAdminRepository;

/// Map known constraint violations to `Conflict` messages an admin can act on.
pub(crate) fn constraint_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && let Some(message) = db_err.constraint().and_then(constraint_message)
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

fn constraint_message(constraint: &str) -> Option<&'static str> {
    match constraint {
        "product_slug_key" => Some("slug already exists"),
        "product_variant_sku_key" => Some("sku already exists"),
        "product_sellerId_fkey" => Some("seller does not exist"),
        "raffle_productId_fkey" => Some("product does not exist"),
        "order_item_variantId_fkey" => Some("variant has been ordered and cannot be deleted"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_messages() {
        assert_eq!(constraint_message("product_slug_key"), Some("slug already exists"));
        assert_eq!(
            constraint_message("order_item_variantId_fkey"),
            Some("variant has been ordered and cannot be deleted")
        );
        assert_eq!(constraint_message("users_pkey"), None);
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        assert!(matches!(
            constraint_error(sqlx::Error::RowNotFound),
            RepositoryError::Database(sqlx::Error::RowNotFound)
        ));
    }
}
