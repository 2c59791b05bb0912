//! ActorEntity implementation for [`Order`].
//!
//! The Order actor depends on three other actors, injected as [`OrderContext`]:
//! users (is the buyer active?), variants (price and inventory) and coupons
//! (discount and redemption bookkeeping).

use super::{OrderAction, OrderError};
use crate::catalog_actor::CatalogError;
use crate::clients::{CouponClient, UserClient, VariantClient};
use crate::model::{
    Order, OrderCreate, OrderId, OrderItem, OrderLine, OrderStatus, OrderUpdate, VariantId,
    MAX_LINE_QUANTITY,
};
use async_trait::async_trait;
use canopy_actors::ActorClient;
use canopy_actors::ActorEntity;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Clients the Order actor talks to.
#[derive(Clone)]
pub struct OrderContext {
    pub users: UserClient,
    pub variants: VariantClient,
    pub coupons: CouponClient,
}

fn stock_error(variant: VariantId, e: CatalogError) -> OrderError {
    match e {
        CatalogError::InsufficientStock {
            requested,
            available,
        } => OrderError::InsufficientStock {
            variant: variant.to_string(),
            requested,
            available,
        },
        CatalogError::NotFound(_) => OrderError::InvalidVariant(variant.to_string()),
        other => OrderError::ActorCommunicationError(other.to_string()),
    }
}

/// Sums quantities of lines that name the same variant, keeping first-seen order.
///
/// A merged quantity above [`MAX_LINE_QUANTITY`] is rejected.
fn merge_lines(lines: Vec<OrderLine>) -> Result<Vec<OrderLine>, OrderError> {
    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|l| l.variant_id == line.variant_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(quantity_too_large)?;
            }
            None => merged.push(line),
        }
    }
    if merged.iter().any(|line| line.quantity > MAX_LINE_QUANTITY) {
        return Err(quantity_too_large());
    }
    Ok(merged)
}

fn total_too_large() -> OrderError {
    OrderError::Validation("order total is too large".to_string())
}

fn quantity_too_large() -> OrderError {
    OrderError::Validation(format!(
        "quantity is too large, at most {MAX_LINE_QUANTITY} per item"
    ))
}

impl Order {
    /// Best-effort release of the reservations held for `items`.
    async fn release_items(items: &[OrderItem], variants: &VariantClient) {
        for item in items {
            if let Err(e) = variants.release_stock(item.variant_id, item.quantity).await {
                warn!(variant = %item.variant_id, error = %e, "Failed to release reservation");
            }
        }
    }

    fn transition(&self, action: &OrderAction, allowed: &[OrderStatus]) -> Result<(), OrderError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(OrderError::InvalidTransition {
                from: self.status,
                action: action.name(),
            })
        }
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = OrderAction;
    type ActionResult = Order;
    type Context = OrderContext;
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        if params.lines.is_empty() {
            return Err(OrderError::Validation(
                "an order needs at least one item".to_string(),
            ));
        }
        if params.lines.iter().any(|line| line.quantity == 0) {
            return Err(OrderError::Validation(
                "quantities must be at least 1".to_string(),
            ));
        }
        let requested = merge_lines(params.lines)?;
        let coupon_code = params
            .coupon_code
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty());

        Ok(Self {
            id,
            user_id: params.user_id,
            items: Vec::new(),
            coupon_code,
            coupon_id: None,
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: Decimal::ZERO,
            status: OrderStatus::Pending,
            shipping_address: params.shipping_address,
            payment_reference: None,
            created_at: Utc::now(),
            paid_at: None,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
            requested,
        })
    }

    /// Prices the order and takes what it needs from the other actors.
    ///
    /// 1. The user must exist and be active.
    /// 2. Every variant must exist and be active; its price becomes the unit price.
    /// 3. Stock is reserved line by line. A failed reservation releases the
    ///    lines reserved before it.
    /// 4. A coupon code is redeemed against the subtotal. A failed redemption
    ///    releases every reservation.
    async fn on_create(&mut self, ctx: &OrderContext) -> Result<(), Self::Error> {
        let user = ctx
            .users
            .get(self.user_id)
            .await
            .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?;
        match user {
            Some(user) if user.is_active => {}
            _ => return Err(OrderError::InvalidUser(self.user_id.to_string())),
        }

        let mut items = Vec::with_capacity(self.requested.len());
        for line in &self.requested {
            let variant = ctx
                .variants
                .get(line.variant_id)
                .await
                .map_err(|e| stock_error(line.variant_id, e))?
                .filter(|v| v.is_active)
                .ok_or_else(|| OrderError::InvalidVariant(line.variant_id.to_string()))?;
            let line_total = variant
                .price
                .checked_mul(Decimal::from(line.quantity))
                .ok_or_else(total_too_large)?;
            items.push(OrderItem {
                variant_id: variant.id,
                product_id: variant.product_id,
                sku: variant.sku,
                quantity: line.quantity,
                unit_price: variant.price,
                line_total,
            });
        }

        for (reserved, item) in items.iter().enumerate() {
            if let Err(e) = ctx
                .variants
                .reserve_stock(item.variant_id, item.quantity)
                .await
            {
                Self::release_items(&items[..reserved], &ctx.variants).await;
                return Err(stock_error(item.variant_id, e));
            }
        }

        let subtotal = match items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total))
        {
            Some(subtotal) => subtotal,
            None => {
                Self::release_items(&items, &ctx.variants).await;
                return Err(total_too_large());
            }
        };
        let mut discount = Decimal::ZERO;
        if let Some(code) = &self.coupon_code {
            let redeemed = match ctx.coupons.find_by_code(code).await {
                Ok(coupon) => ctx
                    .coupons
                    .redeem(coupon.id, subtotal, self.user_id, Utc::now())
                    .await
                    .map(|amount| (coupon.id, amount)),
                Err(e) => Err(e),
            };
            match redeemed {
                Ok((coupon_id, amount)) => {
                    self.coupon_id = Some(coupon_id);
                    discount = amount;
                }
                Err(e) => {
                    Self::release_items(&items, &ctx.variants).await;
                    return Err(OrderError::Coupon(e));
                }
            }
        }

        debug!(order = %self.id, %subtotal, %discount, "Order priced");
        self.items = items;
        self.requested.clear();
        self.subtotal = subtotal;
        self.discount = discount;
        self.total = subtotal - discount;
        Ok(())
    }

    async fn on_update(&mut self, update: OrderUpdate, _ctx: &OrderContext) -> Result<(), Self::Error> {
        match update {}
    }

    /// # Actions
    /// - `MarkPaid`: Pending only; commits the reserved stock
    /// - `Ship`: Paid only
    /// - `Deliver`: Shipped only
    /// - `Cancel`: Pending or Paid; returns stock and releases the coupon
    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderContext,
    ) -> Result<Order, Self::Error> {
        match &action {
            OrderAction::MarkPaid { reference, at } => {
                self.transition(&action, &[OrderStatus::Pending])?;
                for item in &self.items {
                    if let Err(e) = ctx.variants.commit_stock(item.variant_id, item.quantity).await {
                        warn!(variant = %item.variant_id, error = %e, "Failed to commit stock");
                    }
                }
                self.status = OrderStatus::Paid;
                self.payment_reference = Some(reference.clone());
                self.paid_at = Some(*at);
            }
            OrderAction::Ship { at } => {
                self.transition(&action, &[OrderStatus::Paid])?;
                self.status = OrderStatus::Shipped;
                self.shipped_at = Some(*at);
            }
            OrderAction::Deliver { at } => {
                self.transition(&action, &[OrderStatus::Shipped])?;
                self.status = OrderStatus::Delivered;
                self.delivered_at = Some(*at);
            }
            OrderAction::Cancel { at } => {
                self.transition(&action, &[OrderStatus::Pending, OrderStatus::Paid])?;
                if self.status == OrderStatus::Pending {
                    Self::release_items(&self.items, &ctx.variants).await;
                } else {
                    for item in &self.items {
                        let restock = i64::from(item.quantity);
                        if let Err(e) = ctx.variants.adjust_stock(item.variant_id, restock).await {
                            warn!(variant = %item.variant_id, error = %e, "Failed to restock");
                        }
                    }
                }
                if let Some(coupon) = self.coupon_id {
                    if let Err(e) = ctx.coupons.release(coupon, self.user_id).await {
                        warn!(%coupon, error = %e, "Failed to release coupon redemption");
                    }
                }
                self.status = OrderStatus::Cancelled;
                self.cancelled_at = Some(*at);
            }
        }
        Ok(self.clone())
    }
}
