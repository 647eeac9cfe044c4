//! Order domain types.

use chrono::{DateTime, Utc};
use sqlx::types::Json;

use brandbazaar_core::dto::{OrderItemView, OrderView, ShippingAddress};
use brandbazaar_core::{
    Money, OrderId, OrderItemId, OrderStatus, PaymentMethodId, RaffleId, UserId, VariantId,
};

#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub shipping_address: Json<ShippingAddress>,
    pub payment_method_id: Option<PaymentMethodId>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total: Money,
    pub xp_earned: i32,
    pub raffle_id: Option<RaffleId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order line with name, label, and price captured at purchase time.
#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub variant_id: VariantId,
    pub product_name: String,
    pub variant_label: String,
    pub quantity: i32,
    pub unit_price: Money,
}

impl OrderItem {
    #[must_use]
    pub fn view(&self) -> OrderItemView {
        OrderItemView {
            id: self.id,
            variant_id: self.variant_id,
            product_name: self.product_name.clone(),
            variant_label: self.variant_label.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            line_total: self
                .unit_price
                .times(u32::try_from(self.quantity).unwrap_or(0)),
        }
    }
}

impl Order {
    #[must_use]
    pub fn view(&self, items: &[OrderItem]) -> OrderView {
        OrderView {
            id: self.id,
            user_id: self.user_id,
            status: self.status,
            shipping_address: self.shipping_address.0.clone(),
            payment_method_id: self.payment_method_id,
            subtotal: self.subtotal,
            shipping_cost: self.shipping_cost,
            total: self.total,
            xp_earned: self.xp_earned,
            raffle_id: self.raffle_id,
            items: items.iter().map(OrderItem::view).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
