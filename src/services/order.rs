//! Placing and managing orders.

use crate::clients::{CouponClient, OrderClient};
use crate::coupon_actor::CouponError;
use super::OpenIntents;
use crate::jobs::{Job, JobQueue};
use crate::model::{Order, OrderCreate, OrderId, OrderLine, UserId};
use crate::order_actor::OrderError;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaceOrder {
    pub items: Vec<OrderLine>,
    pub coupon_code: Option<String>,
    pub shipping_address: Option<String>,
}

/// Answer to "what would this code take off this subtotal?".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponQuote {
    pub code: String,
    pub valid: bool,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    /// Why the code does not apply.
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    orders: OrderClient,
    coupons: CouponClient,
    intents: OpenIntents,
    jobs: JobQueue,
}

impl OrderService {
    pub fn new(
        orders: OrderClient,
        coupons: CouponClient,
        intents: OpenIntents,
        jobs: JobQueue,
    ) -> Self {
        Self {
            orders,
            coupons,
            intents,
            jobs,
        }
    }

    fn refresh_prices(&self, order: &Order) {
        for product in order.product_ids() {
            self.jobs.dispatch(Job::RefreshProductPrice(product));
        }
    }

    /// Places an order for `user`. Reserved stock changes availability, so the
    /// products' prices are refreshed afterwards.
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn place_order(&self, user: UserId, request: PlaceOrder) -> Result<Order, OrderError> {
        let params = OrderCreate {
            user_id: user,
            lines: request.items,
            coupon_code: request.coupon_code,
            shipping_address: request.shipping_address,
        };
        let id = self.orders.place_order(params).await?;
        let order = self.orders.require(id).await?;
        info!(order = %id, total = %order.total, "Order placed");
        self.refresh_prices(&order);
        Ok(order)
    }

    /// The order, if it belongs to `user`.
    pub async fn order_for(&self, user: UserId, id: OrderId) -> Result<Order, OrderError> {
        let order = self.orders.require(id).await?;
        if order.user_id != user {
            return Err(OrderError::Forbidden(id.to_string()));
        }
        Ok(order)
    }

    pub async fn orders_of(&self, user: UserId) -> Result<Vec<Order>, OrderError> {
        self.orders.for_user(user).await
    }

    pub async fn ship(&self, id: OrderId) -> Result<Order, OrderError> {
        self.orders.ship(id, Utc::now()).await
    }

    pub async fn deliver(&self, id: OrderId) -> Result<Order, OrderError> {
        self.orders.deliver(id, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId) -> Result<Order, OrderError> {
        let order = self.orders.cancel(id, Utc::now()).await?;
        self.intents.forget(id).await;
        self.refresh_prices(&order);
        Ok(order)
    }

    /// Checks a coupon code against a subtotal without redeeming it.
    ///
    /// A code that exists but cannot be used is reported as not valid with a zero
    /// discount.
    #[instrument(skip(self))]
    pub async fn check_coupon(
        &self,
        user: UserId,
        code: &str,
        subtotal: Decimal,
    ) -> Result<CouponQuote, CouponError> {
        let coupon = self.coupons.find_by_code(code).await?;
        let outcome = self
            .coupons
            .validate(coupon.id, subtotal, Some(user), Utc::now())
            .await;
        let (discount, message) = match outcome {
            Ok(discount) => (discount, None),
            Err(CouponError::ActorCommunicationError(e)) => {
                return Err(CouponError::ActorCommunicationError(e))
            }
            Err(e) => (Decimal::ZERO, Some(e.to_string())),
        };
        Ok(CouponQuote {
            code: coupon.code,
            valid: message.is_none(),
            subtotal,
            discount,
            total: subtotal - discount,
            message,
        })
    }
}
