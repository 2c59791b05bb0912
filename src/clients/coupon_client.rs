use crate::coupon_actor::{CouponAction, CouponError};
use crate::model::{Coupon, CouponCreate, CouponId, CouponUpdate, UserId};
use canopy_actors::ActorClient;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

resource_client!(
    /// Client for interacting with the Coupon actor.
    CouponClient,
    Coupon,
    CouponError
);

impl CouponClient {
    #[instrument(skip(self, params), fields(code = %params.code))]
    pub async fn create_coupon(&self, params: CouponCreate) -> Result<CouponId, CouponError> {
        self.inner.create(params).await.map_err(CouponError::from)
    }

    pub async fn require(&self, id: CouponId) -> Result<Coupon, CouponError> {
        self.get(id)
            .await?
            .ok_or_else(|| CouponError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn update_coupon(
        &self,
        id: CouponId,
        update: CouponUpdate,
    ) -> Result<Coupon, CouponError> {
        self.inner.update(id, update).await.map_err(CouponError::from)
    }

    /// Looks a coupon up by code, ignoring case.
    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> Result<Coupon, CouponError> {
        let code = code.trim().to_uppercase();
        self.list()
            .await?
            .into_iter()
            .find(|c| c.code == code)
            .ok_or(CouponError::UnknownCode(code))
    }

    async fn act(&self, id: CouponId, action: CouponAction) -> Result<Decimal, CouponError> {
        debug!(?action, "Sending coupon action");
        self.inner
            .perform_action(id, action)
            .await
            .map_err(CouponError::from)
    }

    pub async fn validate(
        &self,
        id: CouponId,
        subtotal: Decimal,
        user: Option<UserId>,
        at: DateTime<Utc>,
    ) -> Result<Decimal, CouponError> {
        self.act(id, CouponAction::Validate { subtotal, user, at })
            .await
    }

    /// Records one use of the coupon and returns the granted discount.
    #[instrument(skip(self))]
    pub async fn redeem(
        &self,
        id: CouponId,
        subtotal: Decimal,
        user: UserId,
        at: DateTime<Utc>,
    ) -> Result<Decimal, CouponError> {
        self.act(id, CouponAction::Redeem { subtotal, user, at })
            .await
    }

    #[instrument(skip(self))]
    pub async fn release(&self, id: CouponId, user: UserId) -> Result<(), CouponError> {
        self.act(id, CouponAction::Release { user }).await.map(|_| ())
    }

    /// Discount for `code`, or zero when the code is unknown or unusable.
    pub async fn quote(
        &self,
        code: &str,
        subtotal: Decimal,
        user: Option<UserId>,
        at: DateTime<Utc>,
    ) -> Result<Decimal, CouponError> {
        match self.find_by_code(code).await {
            Ok(coupon) => Ok(coupon.quote(subtotal, user, at)),
            Err(CouponError::UnknownCode(_)) => Ok(Decimal::ZERO),
            Err(e) => Err(e),
        }
    }
}
