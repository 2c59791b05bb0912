//! ActorEntity implementation for [`Coupon`].

use super::{CouponAction, CouponError};
use crate::model::{Coupon, CouponCreate, CouponId, CouponKind, CouponUpdate};
use async_trait::async_trait;
use canopy_actors::ActorEntity;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

fn check_kind(kind: CouponKind) -> Result<(), CouponError> {
    match kind {
        CouponKind::Percent(percent) if !(1..=100).contains(&percent) => Err(CouponError::Invalid(
            "percent must be between 1 and 100".to_string(),
        )),
        CouponKind::Fixed(amount) if amount <= Decimal::ZERO => Err(CouponError::Invalid(
            "fixed amount must be positive".to_string(),
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl ActorEntity for Coupon {
    type Id = CouponId;
    type Create = CouponCreate;
    type Update = CouponUpdate;
    type Action = CouponAction;
    type ActionResult = Decimal;
    type Context = ();
    type Error = CouponError;

    fn from_create_params(id: CouponId, params: CouponCreate) -> Result<Self, Self::Error> {
        let code = params.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(CouponError::Invalid("code is required".to_string()));
        }
        check_kind(params.kind)?;
        if let (Some(starts), Some(expires)) = (params.starts_at, params.expires_at) {
            if expires <= starts {
                return Err(CouponError::Invalid(
                    "expiry must be after the start".to_string(),
                ));
            }
        }
        Ok(Self {
            id,
            code,
            kind: params.kind,
            max_discount: params.max_discount,
            min_order_amount: params.min_order_amount,
            usage_limit: params.usage_limit,
            used_count: 0,
            per_user_limit: params.per_user_limit,
            starts_at: params.starts_at,
            expires_at: params.expires_at,
            is_active: params.is_active,
            created_at: Utc::now(),
            redemptions: HashMap::new(),
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.code.clone())
    }

    async fn on_update(&mut self, update: CouponUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        if update.max_discount.is_some() {
            self.max_discount = update.max_discount;
        }
        if update.usage_limit.is_some() {
            self.usage_limit = update.usage_limit;
        }
        if update.expires_at.is_some() {
            self.expires_at = update.expires_at;
        }
        Ok(())
    }

    /// # Actions
    /// - `Validate`: discount for the subtotal, no side effects
    /// - `Redeem`: discount for the subtotal, counts one use globally and for the user
    /// - `Release`: reverts one use by the user, if any
    async fn handle_action(
        &mut self,
        action: CouponAction,
        _ctx: &(),
    ) -> Result<Decimal, Self::Error> {
        match action {
            CouponAction::Validate { subtotal, user, at } => self.discount_for(subtotal, user, at),
            CouponAction::Redeem { subtotal, user, at } => {
                let discount = self.discount_for(subtotal, Some(user), at)?;
                self.used_count = self.used_count.saturating_add(1);
                let by_user = self.redemptions.entry(user).or_insert(0);
                *by_user = by_user.saturating_add(1);
                debug!(code = %self.code, %user, %discount, "Coupon redeemed");
                Ok(discount)
            }
            CouponAction::Release { user } => {
                if let Some(count) = self.redemptions.get_mut(&user) {
                    *count -= 1;
                    if *count == 0 {
                        self.redemptions.remove(&user);
                    }
                    self.used_count = self.used_count.saturating_sub(1);
                }
                Ok(Decimal::ZERO)
            }
        }
    }
}
