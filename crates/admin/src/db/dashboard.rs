//! Aggregates for the dashboard.

use sqlx::PgPool;

use brandbazaar_core::dto::{DashboardStats, LOW_STOCK_THRESHOLD, LowStockVariant, OrderStatusCount};
use brandbazaar_core::{Money, OrderStatus, ProductId, VariantId};

use super::RepositoryError;

/// Cap on low-stock rows returned.
const LOW_STOCK_LIMIT: i64 = 50;

#[derive(Debug, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
struct LowStockRow {
    variant_id: VariantId,
    product_id: ProductId,
    product_name: String,
    sku: String,
    stock: i32,
}

impl From<LowStockRow> for LowStockVariant {
    fn from(row: LowStockRow) -> Self {
        Self {
            variant_id: row.variant_id,
            product_id: row.product_id,
            product_name: row.product_name,
            sku: row.sku,
            stock: row.stock,
        }
    }
}

pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store-wide counts, revenue, and stock alerts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let (user_count, public_product_count, open_raffle_count, revenue): (i64, i64, i64, Money) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM product WHERE "isPublic" AND "deletedAt" IS NULL),
                    (SELECT COUNT(*) FROM raffle WHERE status = 'open'),
                    (SELECT COALESCE(SUM(total), 0) FROM orders
                      WHERE status IN ('paid', 'shipped', 'delivered'))
                "#,
            )
            .fetch_one(self.pool)
            .await?;

        let orders_by_status = sqlx::query_as::<_, (OrderStatus, i64)>(
            "SELECT status, COUNT(*) FROM orders GROUP BY status ORDER BY status",
        )
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(|(status, count)| OrderStatusCount { status, count })
        .collect();

        let low_stock_variants = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT v.id AS "variantId", v."productId", p.name AS "productName", v.sku, v.stock
            FROM product_variant v
            JOIN product p ON p.id = v."productId"
            WHERE v.stock < $1 AND p."deletedAt" IS NULL
            ORDER BY v.stock, v.sku
            LIMIT $2
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(LOW_STOCK_LIMIT)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(LowStockVariant::from)
        .collect();

        Ok(DashboardStats {
            user_count,
            public_product_count,
            orders_by_status,
            revenue,
            open_raffle_count,
            low_stock_variants,
        })
    }
}
