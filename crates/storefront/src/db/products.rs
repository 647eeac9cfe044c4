//! Catalog queries shared by the storefront and the back office.

use sqlx::{PgConnection, PgPool};

use brandbazaar_core::dto::{ProductDetail, ProductFilter, ProductSummary, RatingSummary};
use brandbazaar_core::{Paginated, ProductId, VariantId};

use super::RepositoryError;
use crate::models::{Product, ProductListing, Variant, VariantWithProduct};

/// Product columns, qualified with the `p` alias.
pub const PRODUCT_COLUMNS: &str = r#"
    p.id, p."sellerId", p.name, p.slug, p.description, p.brand, p.category,
    p."basePrice", p."imageUrl", p."isPublic", p."deletedAt", p."createdAt", p."updatedAt"
"#;

/// Aggregate stock flag for `p`.
pub const IN_STOCK_COLUMN: &str = r#"
    EXISTS (
        SELECT 1 FROM product_variant sv WHERE sv."productId" = p.id AND sv.stock > 0
    ) AS "inStock"
"#;

const PUBLIC_FILTER: &str = r#"
    WHERE p."isPublic" AND p."deletedAt" IS NULL
      AND ($1::text IS NULL OR lower(p.category) = lower($1))
      AND ($2::text IS NULL OR lower(p.brand) = lower($2))
      AND ($3::text IS NULL OR p.name ILIKE $3 OR p.brand ILIKE $3 OR p.description ILIKE $3)
      AND ($4::numeric IS NULL OR p."basePrice" >= $4)
      AND ($5::numeric IS NULL OR p."basePrice" <= $5)
"#;

const VARIANT_COLUMNS: &str = r#"
    v.id, v."productId", v.sku, v.size, v.color, v.stock, v."priceModifier"
"#;

const VARIANT_WITH_PRODUCT: &str = r#"
    SELECT v.id, v."productId", v.sku, v.size, v.color, v.stock, v."priceModifier",
           p.name AS "productName", p.slug AS "productSlug", p."imageUrl", p."basePrice",
           (p."isPublic" AND p."deletedAt" IS NULL) AS "isListed"
    FROM product_variant v
    JOIN product p ON p.id = v."productId"
"#;

/// Repository for catalog reads and stock movements.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List public, non-deleted products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_public(
        &self,
        filter: &ProductFilter,
    ) -> Result<Paginated<ProductSummary>, RepositoryError> {
        let page = filter.page_request();
        let pattern = filter.search_pattern();

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM product p {PUBLIC_FILTER}"))
            .bind(filter.category.as_deref())
            .bind(filter.brand.as_deref())
            .bind(pattern.as_deref())
            .bind(filter.min_price)
            .bind(filter.max_price)
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS}, {IN_STOCK_COLUMN} FROM product p {PUBLIC_FILTER} \
             ORDER BY {} LIMIT $6 OFFSET $7",
            filter.sort.order_by()
        );
        let rows = sqlx::query_as::<_, ProductListing>(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.brand.as_deref())
            .bind(pattern.as_deref())
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let items = rows.iter().map(ProductListing::summary).collect();
        Ok(Paginated::new(items, page, total))
    }

    /// Summaries for `ids` that are still listed, in the order given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summaries_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"SELECT {PRODUCT_COLUMNS}, {IN_STOCK_COLUMN} FROM product p
               WHERE p.id = ANY($1) AND p."isPublic" AND p."deletedAt" IS NULL"#
        );
        let rows = sqlx::query_as::<_, ProductListing>(&sql)
            .bind(ids)
            .fetch_all(self.pool)
            .await?;

        Ok(ids
            .iter()
            .filter_map(|id| rows.iter().find(|r| r.product.id == *id))
            .map(ProductListing::summary)
            .collect())
    }

    /// Any product row, listed or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product p WHERE p.id = $1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// A listed product by slug, with variants and rating summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_public_detail(
        &self,
        slug: &str,
    ) -> Result<Option<ProductDetail>, RepositoryError> {
        let sql = format!(
            r#"SELECT {PRODUCT_COLUMNS} FROM product p
               WHERE p.slug = $1 AND p."isPublic" AND p."deletedAt" IS NULL"#
        );
        let Some(product) = sqlx::query_as::<_, Product>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let variants = self.variants(product.id).await?;
        let rating = self.rating(product.id).await?;
        Ok(Some(product.detail(&variants, rating)))
    }

    /// Listed product ID for `slug`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn public_id_by_slug(&self, slug: &str) -> Result<Option<ProductId>, RepositoryError> {
        let id = sqlx::query_scalar(
            r#"SELECT id FROM product WHERE slug = $1 AND "isPublic" AND "deletedAt" IS NULL"#,
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(id)
    }

    /// Variants of a product, in SKU order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn variants(&self, product_id: ProductId) -> Result<Vec<Variant>, RepositoryError> {
        let sql = format!(
            r#"SELECT {VARIANT_COLUMNS} FROM product_variant v WHERE v."productId" = $1 ORDER BY v.sku"#
        );
        let variants = sqlx::query_as::<_, Variant>(&sql)
            .bind(product_id)
            .fetch_all(self.pool)
            .await?;
        Ok(variants)
    }

    /// Review average and count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn rating(&self, product_id: ProductId) -> Result<RatingSummary, RepositoryError> {
        let (average, count): (Option<f64>, i64) = sqlx::query_as(
            r#"SELECT AVG(rating)::float8, COUNT(*) FROM review WHERE "productId" = $1"#,
        )
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;
        Ok(RatingSummary { average, count })
    }

    /// Variants with product info for the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cart_variants(
        &self,
        ids: &[VariantId],
    ) -> Result<Vec<VariantWithProduct>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("{VARIANT_WITH_PRODUCT} WHERE v.id = ANY($1)");
        let rows = sqlx::query_as::<_, VariantWithProduct>(&sql)
            .bind(ids)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// One variant with product info.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn variant(
        &self,
        id: VariantId,
    ) -> Result<Option<VariantWithProduct>, RepositoryError> {
        let sql = format!("{VARIANT_WITH_PRODUCT} WHERE v.id = $1");
        let row = sqlx::query_as::<_, VariantWithProduct>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }
}

/// Lock variant rows for a stock change, in ID order to avoid deadlocks.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_variants(
    conn: &mut PgConnection,
    ids: &[VariantId],
) -> Result<Vec<VariantWithProduct>, RepositoryError> {
    let sql = format!("{VARIANT_WITH_PRODUCT} WHERE v.id = ANY($1) ORDER BY v.id FOR UPDATE OF v");
    let rows = sqlx::query_as::<_, VariantWithProduct>(&sql)
        .bind(ids)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

/// Move stock by `delta` on a locked variant. Stock can't go below zero.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the change would make stock negative.
pub async fn adjust_stock(
    conn: &mut PgConnection,
    id: VariantId,
    delta: i32,
) -> Result<i32, RepositoryError> {
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE product_variant SET stock = stock + $2
        WHERE id = $1 AND stock + $2 >= 0
        RETURNING stock
        "#,
    )
    .bind(id)
    .bind(delta)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| RepositoryError::Conflict("insufficient stock".to_owned()))
}
