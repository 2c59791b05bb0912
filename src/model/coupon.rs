use super::{CouponId, UserId};
use crate::coupon_actor::CouponError;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a coupon reduces the order subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CouponKind {
    /// Whole percent of the subtotal, 1..=100.
    Percent(u8),
    /// Flat amount off.
    Fixed(Decimal),
}

/// A discount code with usage limits and a validity window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coupon {
    pub id: CouponId,
    /// Stored uppercase; unique.
    pub code: String,
    pub kind: CouponKind,
    pub max_discount: Option<Decimal>,
    pub min_order_amount: Option<Decimal>,
    pub usage_limit: Option<u32>,
    pub used_count: u32,
    pub per_user_limit: Option<u32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    /// Redemptions per user, for `per_user_limit`.
    #[serde(skip)]
    pub redemptions: HashMap<UserId, u32>,
}

impl Coupon {
    /// Discount this coupon grants on `subtotal` for `user` at `now`.
    ///
    /// Percent discounts are rounded to cents (midpoint away from zero) and then
    /// capped by `max_discount`. No discount ever exceeds the subtotal.
    pub fn discount_for(
        &self,
        subtotal: Decimal,
        user: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Decimal, CouponError> {
        if !self.is_active {
            return Err(CouponError::Inactive(self.code.clone()));
        }
        if self.starts_at.is_some_and(|starts| now < starts) {
            return Err(CouponError::NotStarted(self.code.clone()));
        }
        if self.expires_at.is_some_and(|expires| now >= expires) {
            return Err(CouponError::Expired(self.code.clone()));
        }
        if self.usage_limit.is_some_and(|limit| self.used_count >= limit) {
            return Err(CouponError::Exhausted(self.code.clone()));
        }
        if let (Some(limit), Some(user)) = (self.per_user_limit, user) {
            if self.redemptions_by(user) >= limit {
                return Err(CouponError::UserLimitReached(self.code.clone()));
            }
        }
        if let Some(minimum) = self.min_order_amount {
            if subtotal < minimum {
                return Err(CouponError::BelowMinimum { minimum });
            }
        }

        let discount = match self.kind {
            CouponKind::Percent(percent) => {
                // A fraction of at most one, so the product stays within range.
                let raw = subtotal * (Decimal::from(percent) / Decimal::ONE_HUNDRED);
                let rounded = raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                match self.max_discount {
                    Some(cap) => rounded.min(cap),
                    None => rounded,
                }
            }
            CouponKind::Fixed(amount) => amount,
        };
        Ok(discount.min(subtotal).max(Decimal::ZERO))
    }

    /// Like [`Coupon::discount_for`], but an unusable coupon simply yields no discount.
    pub fn quote(&self, subtotal: Decimal, user: Option<UserId>, now: DateTime<Utc>) -> Decimal {
        self.discount_for(subtotal, user, now)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn redemptions_by(&self, user: UserId) -> u32 {
        self.redemptions.get(&user).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct CouponCreate {
    pub code: String,
    pub kind: CouponKind,
    pub max_discount: Option<Decimal>,
    pub min_order_amount: Option<Decimal>,
    pub usage_limit: Option<u32>,
    pub per_user_limit: Option<u32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CouponUpdate {
    pub is_active: Option<bool>,
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<u32>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn coupon(kind: CouponKind) -> Coupon {
        Coupon {
            id: CouponId(1),
            code: "TREES".to_string(),
            kind,
            max_discount: None,
            min_order_amount: None,
            usage_limit: None,
            used_count: 0,
            per_user_limit: None,
            starts_at: None,
            expires_at: None,
            is_active: true,
            created_at: Utc::now(),
            redemptions: HashMap::new(),
        }
    }

    #[test]
    fn percent_discount_rounds_half_away_from_zero() {
        let c = coupon(CouponKind::Percent(15));
        // 15% of 10.10 = 1.515
        assert_eq!(c.discount_for(dec!(10.10), None, Utc::now()).unwrap(), dec!(1.52));
    }

    #[test]
    fn percent_discount_of_huge_subtotal_does_not_overflow() {
        let c = coupon(CouponKind::Percent(100));
        assert_eq!(c.discount_for(Decimal::MAX, None, Utc::now()).unwrap(), Decimal::MAX);

        let c = coupon(CouponKind::Percent(50));
        let half = c.discount_for(Decimal::MAX, None, Utc::now()).unwrap();
        assert!(half > Decimal::ZERO && half < Decimal::MAX);
    }

    #[test]
    fn percent_discount_is_capped() {
        let mut c = coupon(CouponKind::Percent(50));
        c.max_discount = Some(dec!(20));
        assert_eq!(c.discount_for(dec!(100), None, Utc::now()).unwrap(), dec!(20));
    }

    #[test]
    fn fixed_discount_never_exceeds_subtotal() {
        let c = coupon(CouponKind::Fixed(dec!(25)));
        assert_eq!(c.discount_for(dec!(18.50), None, Utc::now()).unwrap(), dec!(18.50));
        assert_eq!(c.discount_for(dec!(40), None, Utc::now()).unwrap(), dec!(25));
    }

    #[test]
    fn expired_coupon_yields_no_discount() {
        let now = Utc::now();
        let mut c = coupon(CouponKind::Percent(10));
        c.expires_at = Some(now - Duration::hours(1));

        assert!(matches!(
            c.discount_for(dec!(100), None, now),
            Err(CouponError::Expired(_))
        ));
        assert_eq!(c.quote(dec!(100), None, now), Decimal::ZERO);
    }

    #[test]
    fn window_limits_and_minimum_are_enforced() {
        let now = Utc::now();
        let user = UserId(4);

        let mut not_started = coupon(CouponKind::Percent(10));
        not_started.starts_at = Some(now + Duration::days(1));
        assert!(matches!(
            not_started.discount_for(dec!(50), None, now),
            Err(CouponError::NotStarted(_))
        ));

        let mut exhausted = coupon(CouponKind::Percent(10));
        exhausted.usage_limit = Some(2);
        exhausted.used_count = 2;
        assert!(matches!(
            exhausted.discount_for(dec!(50), None, now),
            Err(CouponError::Exhausted(_))
        ));

        let mut per_user = coupon(CouponKind::Percent(10));
        per_user.per_user_limit = Some(1);
        per_user.redemptions.insert(user, 1);
        assert!(matches!(
            per_user.discount_for(dec!(50), Some(user), now),
            Err(CouponError::UserLimitReached(_))
        ));
        assert_eq!(per_user.discount_for(dec!(50), Some(UserId(5)), now).unwrap(), dec!(5));

        let mut minimum = coupon(CouponKind::Fixed(dec!(5)));
        minimum.min_order_amount = Some(dec!(30));
        assert!(matches!(
            minimum.discount_for(dec!(29.99), None, now),
            Err(CouponError::BelowMinimum { .. })
        ));

        let mut inactive = coupon(CouponKind::Fixed(dec!(5)));
        inactive.is_active = false;
        assert_eq!(inactive.quote(dec!(50), None, now), Decimal::ZERO);
    }
}
