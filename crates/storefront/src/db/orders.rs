//! Orders and their line items.

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use brandbazaar_core::dto::{OrderFilter, OrderView, ShippingAddress};
use brandbazaar_core::pricing::OrderTotals;
use brandbazaar_core::{
    Money, OrderId, OrderItemId, OrderStatus, PageRequest, Paginated, PaymentMethodId, RaffleId,
    UserId, VariantId,
};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

const SELECT_ORDER: &str = r#"
    SELECT id, "userId", status, "shippingAddress", "paymentMethodId", subtotal, "shippingCost",
           total, "xpEarned", "raffleId", "createdAt", "updatedAt"
    FROM orders
"#;

const RETURNING_ORDER: &str = r#"
    RETURNING id, "userId", status, "shippingAddress", "paymentMethodId", subtotal, "shippingCost",
              total, "xpEarned", "raffleId", "createdAt", "updatedAt"
"#;

/// Everything needed to insert an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub payment_method_id: Option<PaymentMethodId>,
    pub totals: OrderTotals,
    pub raffle_id: Option<RaffleId>,
}

/// A line captured at purchase time.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub variant_id: VariantId,
    pub product_name: String,
    pub variant_label: String,
    pub quantity: i32,
    pub unit_price: Money,
}

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Paginated<OrderView>, RepositoryError> {
        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM orders WHERE "userId" = $1"#)
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            r#"{SELECT_ORDER} WHERE "userId" = $1 ORDER BY "createdAt" DESC, id LIMIT $2 OFFSET $3"#
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let items = self.with_items(orders).await?;
        Ok(Paginated::new(items, page, total))
    }

    /// Every order, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &OrderFilter) -> Result<Paginated<OrderView>, RepositoryError> {
        let page = filter.page_request();
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE ($1::order_status IS NULL OR status = $1)")
                .bind(filter.status)
                .fetch_one(self.pool)
                .await?;

        let sql = format!(
            r#"{SELECT_ORDER} WHERE ($1::order_status IS NULL OR status = $1)
               ORDER BY "createdAt" DESC, id LIMIT $2 OFFSET $3"#
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(filter.status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let items = self.with_items(orders).await?;
        Ok(Paginated::new(items, page, total))
    }

    /// An order, restricted to `owner` when given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(
        &self,
        id: OrderId,
        owner: Option<UserId>,
    ) -> Result<Option<OrderView>, RepositoryError> {
        let sql = format!(r#"{SELECT_ORDER} WHERE id = $1 AND ($2::uuid IS NULL OR "userId" = $2)"#);
        let Some(order) = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        let items = items(self.pool, &[id]).await?;
        Ok(Some(order.view(&items)))
    }

    async fn with_items(&self, orders: Vec<Order>) -> Result<Vec<OrderView>, RepositoryError> {
        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let all_items = items(self.pool, &ids).await?;
        Ok(orders
            .iter()
            .map(|o| {
                let lines: Vec<OrderItem> = all_items
                    .iter()
                    .filter(|i| i.order_id == o.id)
                    .cloned()
                    .collect();
                o.view(&lines)
            })
            .collect())
    }
}

async fn items<'e, E>(executor: E, order_ids: &[OrderId]) -> Result<Vec<OrderItem>, RepositoryError>
where
    E: sqlx::PgExecutor<'e>,
{
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT id, "orderId", "variantId", "productName", "variantLabel", quantity, "unitPrice"
        FROM order_item
        WHERE "orderId" = ANY($1)
        ORDER BY "productName", "variantLabel"
        "#,
    )
    .bind(order_ids)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

/// Insert an order and its lines inside the caller's transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if an insert fails.
pub async fn insert(
    conn: &mut PgConnection,
    order: &NewOrder,
    lines: &[NewOrderItem],
) -> Result<OrderView, RepositoryError> {
    let xp_earned = i32::try_from(order.totals.xp_earned).unwrap_or(i32::MAX);
    let sql = format!(
        r#"INSERT INTO orders (id, "userId", status, "shippingAddress", "paymentMethodId",
                               subtotal, "shippingCost", total, "xpEarned", "raffleId")
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
           {RETURNING_ORDER}"#
    );
    let created = sqlx::query_as::<_, Order>(&sql)
        .bind(OrderId::generate())
        .bind(order.user_id)
        .bind(order.status)
        .bind(Json(&order.shipping_address))
        .bind(order.payment_method_id)
        .bind(order.totals.subtotal)
        .bind(order.totals.shipping_cost)
        .bind(order.totals.total)
        .bind(xp_earned)
        .bind(order.raffle_id)
        .fetch_one(&mut *conn)
        .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_item (id, "orderId", "variantId", "productName", "variantLabel",
                                    quantity, "unitPrice")
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, "orderId", "variantId", "productName", "variantLabel", quantity, "unitPrice"
            "#,
        )
        .bind(OrderItemId::generate())
        .bind(created.id)
        .bind(line.variant_id)
        .bind(&line.product_name)
        .bind(&line.variant_label)
        .bind(line.quantity)
        .bind(line.unit_price)
        .fetch_one(&mut *conn)
        .await?;
        items.push(item);
    }

    Ok(created.view(&items))
}

/// Lock an order row, restricted to `owner` when given.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock(
    conn: &mut PgConnection,
    id: OrderId,
    owner: Option<UserId>,
) -> Result<Option<Order>, RepositoryError> {
    let sql = format!(
        r#"{SELECT_ORDER} WHERE id = $1 AND ($2::uuid IS NULL OR "userId" = $2) FOR UPDATE"#
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .bind(owner)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Lines of a locked order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lines(conn: &mut PgConnection, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
    items(conn, &[id]).await
}

/// Set an order's status.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order doesn't exist.
pub async fn set_status(
    conn: &mut PgConnection,
    id: OrderId,
    status: OrderStatus,
) -> Result<Order, RepositoryError> {
    let sql = format!(r#"UPDATE orders SET status = $2, "updatedAt" = now() WHERE id = $1 {RETURNING_ORDER}"#);
    sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .bind(status)
        .fetch_optional(conn)
        .await?
        .ok_or(RepositoryError::NotFound)
}
