use super::{CouponId, OrderId, ProductId, UserId, VariantId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A priced line of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub sku: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Most units of one variant a single order may ask for.
pub const MAX_LINE_QUANTITY: u32 = 1_000;

/// A requested line, before the order actor resolves and prices it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub variant_id: VariantId,
    pub quantity: u32,
}

/// Represents a customer order.
///
/// # Actor Framework
/// Implements [`ActorEntity`](canopy_actors::ActorEntity); `on_create` validates the
/// user, reserves stock and redeems the coupon, see [`crate::order_actor`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub coupon_code: Option<String>,
    pub coupon_id: Option<CouponId>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub shipping_address: Option<String>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Lines waiting to be priced by `on_create`.
    #[serde(skip)]
    pub requested: Vec<OrderLine>,
}

impl Order {
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.items.iter().map(|item| item.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub coupon_code: Option<String>,
    pub shipping_address: Option<String>,
}

/// Orders are changed through actions only.
pub type OrderUpdate = std::convert::Infallible;
