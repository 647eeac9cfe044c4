//! Catalog management: products, visibility, soft delete, and variants.
//!
//! Reads return [`AdminProductView`]s, which include hidden and deleted
//! products. Writes map slug, SKU, and seller constraint violations to
//! `Conflict` through [`constraint_error`].

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};

use brandbazaar_core::dto::{
    AdminProductFilter, AdminProductView, CreateProduct, CreateVariant, ProductVisibility,
    RatingSummary, UpdateProduct, UpdateVariant, like_pattern,
};
use brandbazaar_core::{Paginated, ProductId, VariantId};
use brandbazaar_storefront::db::products::PRODUCT_COLUMNS;
use brandbazaar_storefront::models::{Product, Variant};

use super::{RepositoryError, constraint_error};

const VARIANT_COLUMNS: &str = r#"id, "productId", sku, size, color, stock, "priceModifier""#;

/// Product rows for the admin list. `$1` search pattern, `$2` category.
const ADMIN_FILTER: &str = r#"
    ($1::text IS NULL OR p.name ILIKE $1 OR p.brand ILIKE $1 OR p.slug ILIKE $1)
    AND ($2::text IS NULL OR lower(p.category) = lower($2))
"#;

#[derive(Debug, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
struct RatingRow {
    product_id: ProductId,
    average: Option<f64>,
    count: i64,
}

/// SQL condition selecting products in `visibility`.
const fn visibility_condition(visibility: ProductVisibility) -> &'static str {
    match visibility {
        ProductVisibility::All => r#"p."deletedAt" IS NULL"#,
        ProductVisibility::Public => r#"p."isPublic" AND p."deletedAt" IS NULL"#,
        ProductVisibility::Hidden => r#"NOT p."isPublic" AND p."deletedAt" IS NULL"#,
        ProductVisibility::Deleted => r#"p."deletedAt" IS NOT NULL"#,
    }
}

pub struct CatalogAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogAdminRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Products in any state, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &AdminProductFilter,
    ) -> Result<Paginated<AdminProductView>, RepositoryError> {
        let page = filter.page_request();
        let pattern = filter
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_pattern);
        let category = filter.category.as_deref().filter(|c| !c.is_empty());
        let visibility = visibility_condition(filter.visibility);

        let count_sql =
            format!("SELECT COUNT(*) FROM product p WHERE {ADMIN_FILTER} AND {visibility}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(pattern.as_deref())
            .bind(category)
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            r#"SELECT {PRODUCT_COLUMNS} FROM product p
               WHERE {ADMIN_FILTER} AND {visibility}
               ORDER BY p."updatedAt" DESC, p.id
               LIMIT $3 OFFSET $4"#
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern.as_deref())
            .bind(category)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let items = self.with_details(products).await?;
        Ok(Paginated::new(items, page, total))
    }

    /// Any product, including hidden and deleted ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<AdminProductView>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product p WHERE p.id = $1");
        let Some(product) = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        Ok(self.with_details(vec![product]).await?.pop())
    }

    /// Product ID for `slug`, deleted products included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn id_by_slug(&self, slug: &str) -> Result<Option<ProductId>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT id FROM product WHERE slug = $1")
            .bind(slug)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Whether any variant already uses `sku`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sku_exists(&self, sku: &str) -> Result<bool, RepositoryError> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM product_variant WHERE sku = $1)")
                .bind(sku)
                .fetch_one(self.pool)
                .await?,
        )
    }

    /// Create a product and its initial variants in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug or SKU, or an
    /// unknown seller.
    pub async fn create(&self, input: &CreateProduct) -> Result<ProductId, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id = ProductId::generate();

        sqlx::query(
            r#"
            INSERT INTO product
                (id, "sellerId", name, slug, description, brand, category, "basePrice",
                 "imageUrl", "isPublic")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(input.seller_id)
        .bind(input.name.trim())
        .bind(input.resolved_slug())
        .bind(input.description.trim())
        .bind(input.brand.trim())
        .bind(input.category.trim())
        .bind(input.base_price)
        .bind(input.image_url.as_deref())
        .bind(input.is_public)
        .execute(&mut *tx)
        .await
        .map_err(constraint_error)?;

        for variant in &input.variants {
            insert_variant(&mut tx, id, variant).await?;
        }

        tx.commit().await?;
        tracing::info!(product_id = %id, variants = input.variants.len(), "product created");
        Ok(id)
    }

    /// Apply a partial update. Absent fields keep their value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist and
    /// `RepositoryError::Conflict` on a duplicate slug or unknown seller.
    pub async fn update(&self, id: ProductId, input: &UpdateProduct) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE product SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                brand = COALESCE($5, brand),
                category = COALESCE($6, category),
                "basePrice" = COALESCE($7, "basePrice"),
                "imageUrl" = CASE WHEN $8 THEN $9 ELSE "imageUrl" END,
                "sellerId" = CASE WHEN $10 THEN $11 ELSE "sellerId" END,
                "updatedAt" = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.slug.as_deref().map(str::trim))
        .bind(input.description.as_deref().map(str::trim))
        .bind(input.brand.as_deref().map(str::trim))
        .bind(input.category.as_deref().map(str::trim))
        .bind(input.base_price)
        .bind(input.image_url.is_some())
        .bind(input.image_url.clone().flatten())
        .bind(input.seller_id.is_some())
        .bind(input.seller_id.flatten())
        .execute(self.pool)
        .await
        .map_err(constraint_error)?;

        found(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_visibility(&self, id: ProductId, is_public: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE product SET "isPublic" = $2, "updatedAt" = now() WHERE id = $1"#,
        )
        .bind(id)
        .bind(is_public)
        .execute(self.pool)
        .await?;

        tracing::info!(product_id = %id, is_public, "product visibility changed");
        found(result.rows_affected())
    }

    /// Hide a product from customers and listings without removing its rows.
    /// Deleting twice keeps the first timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn soft_delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE product SET "deletedAt" = COALESCE("deletedAt", now()), "updatedAt" = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        tracing::info!(product_id = %id, "product deleted");
        found(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn restore(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE product SET "deletedAt" = NULL, "updatedAt" = now() WHERE id = $1"#,
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        tracing::info!(product_id = %id, "product restored");
        found(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate SKU.
    pub async fn create_variant(
        &self,
        product_id: ProductId,
        input: &CreateVariant,
    ) -> Result<Variant, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let variant = insert_variant(&mut conn, product_id, input).await?;
        touch(&mut conn, product_id).await?;
        Ok(variant)
    }

    /// Apply a partial variant update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant isn't on this
    /// product and `RepositoryError::Conflict` on a duplicate SKU.
    pub async fn update_variant(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
        input: &UpdateVariant,
    ) -> Result<Variant, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE product_variant SET
                sku = COALESCE($3, sku),
                size = COALESCE($4, size),
                color = COALESCE($5, color),
                stock = COALESCE($6, stock),
                "priceModifier" = COALESCE($7, "priceModifier")
            WHERE id = $1 AND "productId" = $2
            RETURNING {VARIANT_COLUMNS}
            "#
        );
        let mut conn = self.pool.acquire().await?;
        let variant = sqlx::query_as::<_, Variant>(&sql)
            .bind(variant_id)
            .bind(product_id)
            .bind(input.sku.as_deref().map(str::trim))
            .bind(input.size.as_deref().map(str::trim))
            .bind(input.color.as_deref().map(str::trim))
            .bind(input.stock)
            .bind(input.price_modifier)
            .fetch_optional(&mut *conn)
            .await
            .map_err(constraint_error)?
            .ok_or(RepositoryError::NotFound)?;
        touch(&mut conn, product_id).await?;
        Ok(variant)
    }

    /// Remove a variant that was never ordered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant isn't on this
    /// product and `RepositoryError::Conflict` if order lines reference it.
    pub async fn delete_variant(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let result =
            sqlx::query(r#"DELETE FROM product_variant WHERE id = $1 AND "productId" = $2"#)
                .bind(variant_id)
                .bind(product_id)
                .execute(&mut *conn)
                .await
                .map_err(constraint_error)?;
        found(result.rows_affected())?;
        touch(&mut conn, product_id).await
    }

    /// Attach variants and ratings to product rows, keeping their order.
    async fn with_details(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<AdminProductView>, RepositoryError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();

        let sql = format!(
            r#"SELECT {VARIANT_COLUMNS} FROM product_variant
               WHERE "productId" = ANY($1) ORDER BY sku"#
        );
        let mut variants: HashMap<ProductId, Vec<Variant>> = HashMap::new();
        for variant in sqlx::query_as::<_, Variant>(&sql)
            .bind(&ids)
            .fetch_all(self.pool)
            .await?
        {
            variants.entry(variant.product_id).or_default().push(variant);
        }

        let ratings: HashMap<ProductId, RatingSummary> = sqlx::query_as::<_, RatingRow>(
            r#"
            SELECT "productId", AVG(rating)::float8 AS average, COUNT(*) AS count
            FROM review WHERE "productId" = ANY($1)
            GROUP BY "productId"
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(|r| {
            (
                r.product_id,
                RatingSummary {
                    average: r.average,
                    count: r.count,
                },
            )
        })
        .collect();

        Ok(products
            .iter()
            .map(|p| {
                let rating = ratings.get(&p.id).copied().unwrap_or_default();
                p.admin_view(variants.get(&p.id).map_or(&[], Vec::as_slice), rating)
            })
            .collect())
    }
}

async fn insert_variant(
    conn: &mut PgConnection,
    product_id: ProductId,
    input: &CreateVariant,
) -> Result<Variant, RepositoryError> {
    let sql = format!(
        r#"
        INSERT INTO product_variant (id, "productId", sku, size, color, stock, "priceModifier")
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {VARIANT_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Variant>(&sql)
        .bind(VariantId::generate())
        .bind(product_id)
        .bind(input.sku.trim())
        .bind(input.size.trim())
        .bind(input.color.trim())
        .bind(input.stock)
        .bind(input.price_modifier)
        .fetch_one(conn)
        .await
        .map_err(|e| match constraint_error(e) {
            RepositoryError::Database(sqlx::Error::Database(db_err))
                if db_err.is_foreign_key_violation() =>
            {
                RepositoryError::NotFound
            }
            other => other,
        })
}

/// Bump `updatedAt` after a variant change.
async fn touch(conn: &mut PgConnection, product_id: ProductId) -> Result<(), RepositoryError> {
    sqlx::query(r#"UPDATE product SET "updatedAt" = now() WHERE id = $1"#)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

fn found(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_visibility_hides_deleted() {
        assert_eq!(
            visibility_condition(ProductVisibility::default()),
            r#"p."deletedAt" IS NULL"#
        );
        assert!(visibility_condition(ProductVisibility::Deleted).contains("IS NOT NULL"));
    }

    #[test]
    fn test_found() {
        assert!(found(1).is_ok());
        assert!(matches!(found(0), Err(RepositoryError::NotFound)));
    }
}
