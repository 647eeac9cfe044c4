//! Wishlists. Adds and removes are idempotent.

use sqlx::PgPool;

use brandbazaar_core::dto::ProductSummary;
use brandbazaar_core::{ProductId, UserId};

use super::RepositoryError;
use super::products::{IN_STOCK_COLUMN, PRODUCT_COLUMNS};
use crate::models::ProductListing;

pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Listed products on the user's wishlist, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<ProductSummary>, RepositoryError> {
        let sql = format!(
            r#"SELECT {PRODUCT_COLUMNS}, {IN_STOCK_COLUMN}
               FROM wishlist_item w
               JOIN product p ON p.id = w."productId"
               WHERE w."userId" = $1 AND p."isPublic" AND p."deletedAt" IS NULL
               ORDER BY w."createdAt" DESC"#
        );
        let rows = sqlx::query_as::<_, ProductListing>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.iter().map(ProductListing::summary).collect())
    }

    /// Add a product. Adding twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO wishlist_item ("userId", "productId") VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Remove a product. Removing an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(r#"DELETE FROM wishlist_item WHERE "userId" = $1 AND "productId" = $2"#)
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
