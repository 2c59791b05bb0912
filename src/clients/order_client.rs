use crate::model::{Order, OrderCreate, OrderId, UserId};
use crate::order_actor::{OrderAction, OrderError};
use canopy_actors::ActorClient;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

resource_client!(
    /// Client for interacting with the Order actor.
    OrderClient,
    Order,
    OrderError
);

impl OrderClient {
    /// Places an order. Stock is reserved and the coupon redeemed before this
    /// returns.
    #[instrument(skip(self, params), fields(user = %params.user_id))]
    pub async fn place_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?params, "place_order called");
        self.inner.create(params).await.map_err(OrderError::from)
    }

    pub async fn require(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    pub async fn for_user(&self, user: UserId) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.list().await?;
        orders.retain(|o| o.user_id == user);
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn perform(&self, id: OrderId, action: OrderAction) -> Result<Order, OrderError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(OrderError::from)
    }

    pub async fn mark_paid(
        &self,
        id: OrderId,
        reference: String,
        at: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        self.perform(id, OrderAction::MarkPaid { reference, at }).await
    }

    pub async fn ship(&self, id: OrderId, at: DateTime<Utc>) -> Result<Order, OrderError> {
        self.perform(id, OrderAction::Ship { at }).await
    }

    pub async fn deliver(&self, id: OrderId, at: DateTime<Utc>) -> Result<Order, OrderError> {
        self.perform(id, OrderAction::Deliver { at }).await
    }

    pub async fn cancel(&self, id: OrderId, at: DateTime<Utc>) -> Result<Order, OrderError> {
        self.perform(id, OrderAction::Cancel { at }).await
    }
}
