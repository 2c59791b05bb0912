//! Payment gateway integration.
//!
//! Checkout creates a payment intent for the order total; the client app
//! completes the payment with the returned `client_secret` and the server then
//! confirms the order by verifying the intent's status with the gateway.

use crate::model::OrderId;
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment gateway returned status {0}")]
    Status(u16),

    #[error("amount cannot be charged: {0}")]
    InvalidAmount(Decimal),

    #[error("unknown payment intent: {0}")]
    UnknownIntent(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentIntent {
    /// Gateway reference, later passed to [`PaymentGateway::verify`].
    pub id: String,
    pub client_secret: String,
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        order: OrderId,
        amount: Decimal,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError>;

    async fn verify(&self, reference: &str) -> Result<PaymentStatus, PaymentError>;
}

/// Amount in the currency's minor unit (cents).
fn minor_units(amount: Decimal) -> Result<i64, PaymentError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .filter(|units| *units > 0)
        .ok_or(PaymentError::InvalidAmount(amount))
}

#[derive(Serialize)]
struct IntentRequest<'a> {
    amount: i64,
    currency: &'a str,
    metadata: IntentMetadata,
}

#[derive(Serialize)]
struct IntentMetadata {
    order_id: u32,
}

#[derive(Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: String,
    #[serde(default)]
    status: String,
}

fn status_from(raw: &str) -> PaymentStatus {
    match raw {
        "succeeded" => PaymentStatus::Succeeded,
        "canceled" | "failed" | "requires_payment_method" => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    }
}

/// Stripe-style REST gateway authenticated with a bearer secret.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    endpoint: String,
    secret: String,
}

impl HttpPaymentGateway {
    pub fn new(endpoint: String, secret: String) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            secret,
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    #[instrument(skip(self))]
    async fn create_intent(
        &self,
        order: OrderId,
        amount: Decimal,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let request = IntentRequest {
            amount: minor_units(amount)?,
            currency,
            metadata: IntentMetadata { order_id: order.0 },
        };
        let response = self
            .client
            .post(format!("{}/payment_intents", self.endpoint))
            .bearer_auth(&self.secret)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PaymentError::Status(response.status().as_u16()));
        }
        let intent: IntentResponse = response.json().await?;
        debug!(intent = %intent.id, status = %intent.status, "Payment intent created");
        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
            amount,
            currency: currency.to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn verify(&self, reference: &str) -> Result<PaymentStatus, PaymentError> {
        let response = self
            .client
            .get(format!("{}/payment_intents/{reference}", self.endpoint))
            .bearer_auth(&self.secret)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentError::UnknownIntent(reference.to_string()));
        }
        if !response.status().is_success() {
            return Err(PaymentError::Status(response.status().as_u16()));
        }
        let intent: IntentResponse = response.json().await?;
        Ok(status_from(&intent.status))
    }
}

/// In-memory gateway. New intents verify as `Succeeded` unless told otherwise.
#[derive(Default)]
pub struct FakePaymentGateway {
    next: AtomicU32,
    intents: Mutex<HashMap<String, PaymentStatus>>,
}

impl FakePaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, reference: &str, status: PaymentStatus) {
        self.intents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reference.to_string(), status);
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_intent(
        &self,
        order: OrderId,
        amount: Decimal,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        minor_units(amount)?;
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("pi_fake_{n}");
        self.set_status(&id, PaymentStatus::Succeeded);
        Ok(PaymentIntent {
            client_secret: format!("{id}_secret_{}", order.0),
            id,
            amount,
            currency: currency.to_string(),
        })
    }

    async fn verify(&self, reference: &str) -> Result<PaymentStatus, PaymentError> {
        self.intents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(reference)
            .copied()
            .ok_or_else(|| PaymentError::UnknownIntent(reference.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amounts_convert_to_minor_units() {
        assert_eq!(minor_units(dec!(49.99)).unwrap(), 4999);
        assert_eq!(minor_units(dec!(0.005)).unwrap(), 1);
        assert!(matches!(minor_units(dec!(0)), Err(PaymentError::InvalidAmount(_))));
        assert!(matches!(minor_units(Decimal::MAX), Err(PaymentError::InvalidAmount(_))));
    }

    #[test]
    fn gateway_statuses_map_to_three_states() {
        assert_eq!(status_from("succeeded"), PaymentStatus::Succeeded);
        assert_eq!(status_from("processing"), PaymentStatus::Pending);
        assert_eq!(status_from("canceled"), PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn fake_gateway_tracks_intents() {
        let gateway = FakePaymentGateway::new();
        let intent = gateway.create_intent(OrderId(3), dec!(20), "inr").await.unwrap();
        assert_eq!(gateway.verify(&intent.id).await.unwrap(), PaymentStatus::Succeeded);

        gateway.set_status(&intent.id, PaymentStatus::Failed);
        assert_eq!(gateway.verify(&intent.id).await.unwrap(), PaymentStatus::Failed);
        assert!(matches!(
            gateway.verify("pi_missing").await,
            Err(PaymentError::UnknownIntent(_))
        ));
    }
}
