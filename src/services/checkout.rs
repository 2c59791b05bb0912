//! Paying for an order through the payment gateway.
//!
//! ```text
//! checkout(order) ──► gateway intent ──► client pays ──► confirm(order, intent id)
//!                                                          │
//!                                           verify ◄───────┘ ──► MarkPaid + NotifyUser
//! ```

use crate::clients::OrderClient;
use crate::jobs::{Job, JobQueue};
use crate::model::{Order, OrderId, OrderStatus, UserId};
use crate::notifications::PushMessage;
use crate::order_actor::OrderError;
use crate::payments::{PaymentError, PaymentGateway, PaymentIntent, PaymentStatus};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("Only pending orders can be paid, this order is {0}")]
    NotPending(OrderStatus),

    #[error("Payment {0} does not belong to this order")]
    UnknownIntent(String),

    #[error("The payment has not completed yet")]
    PaymentPending,

    #[error("The payment failed")]
    PaymentFailed,
}

/// Payment intents still open, by order.
///
/// Shared with [`OrderService`](super::OrderService) so a cancelled order drops
/// its intent. The lock is never held across a gateway call.
#[derive(Clone, Default)]
pub struct OpenIntents {
    inner: Arc<Mutex<HashMap<OrderId, PaymentIntent>>>,
}

impl OpenIntents {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, order: OrderId) -> Option<PaymentIntent> {
        self.inner.lock().await.get(&order).cloned()
    }

    /// Records `intent` unless another checkout opened one first; returns the
    /// intent that is kept.
    pub(super) async fn keep_first(&self, order: OrderId, intent: PaymentIntent) -> PaymentIntent {
        self.inner
            .lock()
            .await
            .entry(order)
            .or_insert(intent)
            .clone()
    }

    pub async fn forget(&self, order: OrderId) {
        self.inner.lock().await.remove(&order);
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[derive(Clone)]
pub struct CheckoutService {
    orders: OrderClient,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    intents: OpenIntents,
    jobs: JobQueue,
}

impl CheckoutService {
    pub fn new(
        orders: OrderClient,
        gateway: Arc<dyn PaymentGateway>,
        currency: String,
        intents: OpenIntents,
        jobs: JobQueue,
    ) -> Self {
        Self {
            orders,
            gateway,
            currency,
            intents,
            jobs,
        }
    }

    async fn owned_order(&self, user: UserId, id: OrderId) -> Result<Order, CheckoutError> {
        let order = self.orders.require(id).await?;
        if order.user_id != user {
            return Err(OrderError::Forbidden(id.to_string()).into());
        }
        Ok(order)
    }

    /// Opens a payment intent for the order total, or returns the one already open.
    ///
    /// Two concurrent checkouts of the same order may both reach the gateway; the
    /// first intent recorded wins and the other is abandoned.
    #[instrument(skip(self))]
    pub async fn checkout(&self, user: UserId, id: OrderId) -> Result<PaymentIntent, CheckoutError> {
        let order = self.owned_order(user, id).await?;
        if order.status != OrderStatus::Pending {
            self.intents.forget(id).await;
            return Err(CheckoutError::NotPending(order.status));
        }
        if let Some(intent) = self.intents.get(id).await {
            return Ok(intent);
        }
        let intent = self
            .gateway
            .create_intent(id, order.total, &self.currency)
            .await?;
        let kept = self.intents.keep_first(id, intent.clone()).await;
        if kept.id == intent.id {
            info!(order = %id, intent = %intent.id, amount = %intent.amount, "Payment intent opened");
        } else {
            debug!(order = %id, abandoned = %intent.id, "Concurrent checkout, reusing open intent");
        }
        Ok(kept)
    }

    /// Verifies the payment with the gateway and marks the order paid.
    ///
    /// Confirming an order that was already paid with the same reference returns
    /// it unchanged.
    #[instrument(skip(self))]
    pub async fn confirm(
        &self,
        user: UserId,
        id: OrderId,
        reference: &str,
    ) -> Result<Order, CheckoutError> {
        let order = self.owned_order(user, id).await?;
        if order.status == OrderStatus::Paid
            && order.payment_reference.as_deref() == Some(reference)
        {
            return Ok(order);
        }
        if order.status != OrderStatus::Pending {
            self.intents.forget(id).await;
            return Err(CheckoutError::NotPending(order.status));
        }
        let known = self
            .intents
            .get(id)
            .await
            .is_some_and(|intent| intent.id == reference);
        if !known {
            return Err(CheckoutError::UnknownIntent(reference.to_string()));
        }

        match self.gateway.verify(reference).await? {
            PaymentStatus::Succeeded => {}
            PaymentStatus::Pending => return Err(CheckoutError::PaymentPending),
            PaymentStatus::Failed => {
                warn!(order = %id, reference, "Payment failed");
                self.intents.forget(id).await;
                return Err(CheckoutError::PaymentFailed);
            }
        }

        let order = self
            .orders
            .mark_paid(id, reference.to_string(), Utc::now())
            .await?;
        self.intents.forget(id).await;
        let message = PushMessage::new(
            "Payment received",
            format!("Your order #{} is confirmed.", id.0),
        )
        .with_data("order_id", id.0.to_string());
        self.jobs.dispatch(Job::NotifyUser { user, message });
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::CouponClient;
    use crate::jobs::JobWorker;
    use crate::model::{Coupon, OrderId};
    use crate::payments::FakePaymentGateway;
    use crate::services::OrderService;
    use async_trait::async_trait;
    use canopy_actors::mock::MockClient;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn order(id: u32, status: OrderStatus) -> Order {
        Order {
            id: OrderId(id),
            user_id: UserId(1),
            items: Vec::new(),
            coupon_code: None,
            coupon_id: None,
            subtotal: dec!(100),
            discount: Decimal::ZERO,
            total: dec!(100),
            status,
            shipping_address: None,
            payment_reference: None,
            created_at: Utc::now(),
            paid_at: None,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
            requested: Vec::new(),
        }
    }

    /// Holds intent creation for order 1 until released.
    #[derive(Default)]
    struct StallingGateway {
        entered: Notify,
        release: Notify,
        inner: FakePaymentGateway,
    }

    #[async_trait]
    impl PaymentGateway for StallingGateway {
        async fn create_intent(
            &self,
            order: OrderId,
            amount: Decimal,
            currency: &str,
        ) -> Result<PaymentIntent, PaymentError> {
            if order == OrderId(1) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.create_intent(order, amount, currency).await
        }

        async fn verify(&self, reference: &str) -> Result<PaymentStatus, PaymentError> {
            self.inner.verify(reference).await
        }
    }

    #[tokio::test]
    async fn test_slow_gateway_does_not_block_other_checkouts() {
        let mut orders = MockClient::<Order>::new();
        orders.expect_get(OrderId(1)).return_ok(Some(order(1, OrderStatus::Pending)));
        orders.expect_get(OrderId(2)).return_ok(Some(order(2, OrderStatus::Pending)));

        let gateway = Arc::new(StallingGateway::default());
        let (_worker, jobs) = JobWorker::new();
        let intents = OpenIntents::new();
        let service = CheckoutService::new(
            OrderClient::new(orders.client()),
            gateway.clone(),
            "inr".to_string(),
            intents.clone(),
            jobs,
        );

        let stalled = {
            let service = service.clone();
            tokio::spawn(async move { service.checkout(UserId(1), OrderId(1)).await })
        };
        gateway.entered.notified().await;

        let other = tokio::time::timeout(
            Duration::from_secs(2),
            service.checkout(UserId(1), OrderId(2)),
        )
        .await
        .expect("second checkout must not wait for the first gateway call")
        .unwrap();
        assert_eq!(intents.get(OrderId(2)).await, Some(other));

        gateway.release.notify_one();
        let first = stalled.await.unwrap().unwrap();
        assert_eq!(intents.get(OrderId(1)).await, Some(first));
        assert_eq!(intents.len().await, 2);
        orders.verify();
    }

    #[tokio::test]
    async fn test_first_recorded_intent_wins() {
        let intents = OpenIntents::new();
        let gateway = FakePaymentGateway::new();
        let a = gateway.create_intent(OrderId(4), dec!(10), "inr").await.unwrap();
        let b = gateway.create_intent(OrderId(4), dec!(10), "inr").await.unwrap();

        assert_eq!(intents.keep_first(OrderId(4), a.clone()).await, a);
        assert_eq!(intents.keep_first(OrderId(4), b).await, a);
        assert_eq!(intents.len().await, 1);
    }

    #[tokio::test]
    async fn test_cancelled_order_drops_its_intent() {
        let mut orders = MockClient::<Order>::new();
        orders
            .expect_action(OrderId(3))
            .return_ok(order(3, OrderStatus::Cancelled));
        let coupons = MockClient::<Coupon>::new();

        let intents = OpenIntents::new();
        let intent = FakePaymentGateway::new()
            .create_intent(OrderId(3), dec!(100), "inr")
            .await
            .unwrap();
        intents.keep_first(OrderId(3), intent).await;

        let (_worker, jobs) = JobWorker::new();
        let service = OrderService::new(
            OrderClient::new(orders.client()),
            CouponClient::new(coupons.client()),
            intents.clone(),
            jobs,
        );
        let cancelled = service.cancel(OrderId(3)).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(intents.get(OrderId(3)).await, None);
        assert_eq!(intents.len().await, 0);
        orders.verify();
    }
}
