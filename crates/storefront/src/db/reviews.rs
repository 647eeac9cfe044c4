//! Product reviews.

use sqlx::PgPool;

use brandbazaar_core::dto::CreateReview;
use brandbazaar_core::{PageRequest, Paginated, ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;

const SELECT_REVIEW: &str = r#"
    SELECT r.id, r."productId", r."userId", u."displayName" AS author,
           r.rating, r.title, r.body, r."createdAt"
    FROM review r
    JOIN users u ON u.id = r."userId"
"#;

pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
        page: PageRequest,
    ) -> Result<Paginated<Review>, RepositoryError> {
        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM review WHERE "productId" = $1"#)
            .bind(product_id)
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            r#"{SELECT_REVIEW} WHERE r."productId" = $1
               ORDER BY r."createdAt" DESC, r.id LIMIT $2 OFFSET $3"#
        );
        let items = sqlx::query_as::<_, Review>(&sql)
            .bind(product_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Paginated::new(items, page, total))
    }

    /// Most recent reviews across the catalog, for moderation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, page: PageRequest) -> Result<Paginated<Review>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM review")
            .fetch_one(self.pool)
            .await?;

        let sql = format!(r#"{SELECT_REVIEW} ORDER BY r."createdAt" DESC, r.id LIMIT $1 OFFSET $2"#);
        let items = sqlx::query_as::<_, Review>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Paginated::new(items, page, total))
    }

    /// Create a review. One per user per product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the product.
    pub async fn create(
        &self,
        product_id: ProductId,
        user_id: UserId,
        input: &CreateReview,
    ) -> Result<Review, RepositoryError> {
        let id = ReviewId::generate();
        sqlx::query(
            r#"
            INSERT INTO review (id, "productId", "userId", rating, title, body)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(product_id)
        .bind(user_id)
        .bind(input.rating)
        .bind(input.title.trim())
        .bind(input.body.trim())
        .execute(self.pool)
        .await
        .map_err(RepositoryError::unique("you have already reviewed this product"))?;

        let sql = format!("{SELECT_REVIEW} WHERE r.id = $1");
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(review)
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such review exists.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM review WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
