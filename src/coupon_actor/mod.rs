//! # Coupon Actor
//!
//! Discount codes with usage limits. The discount rules live on
//! [`Coupon::discount_for`](crate::model::Coupon::discount_for); the actor adds the
//! bookkeeping: redemptions are counted globally and per user, and an order
//! cancellation releases its redemption again.
//!
//! Codes are stored uppercase and are unique.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::CouponClient;
use crate::model::Coupon;
use canopy_actors::ResourceActor;

/// Creates a new Coupon actor and its client.
pub fn new(buffer: usize) -> (ResourceActor<Coupon>, CouponClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, CouponClient::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CouponCreate, CouponKind, UserId};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn params(code: &str) -> CouponCreate {
        CouponCreate {
            code: code.to_string(),
            kind: CouponKind::Percent(10),
            max_discount: None,
            min_order_amount: None,
            usage_limit: Some(2),
            per_user_limit: Some(1),
            starts_at: None,
            expires_at: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_redeem_counts_and_release_reverts() {
        let (actor, coupons) = new(8);
        tokio::spawn(actor.run(()));
        coupons.create_coupon(params(" spring10 ")).await.unwrap();

        let coupon = coupons.find_by_code("Spring10").await.unwrap();
        assert_eq!(coupon.code, "SPRING10");

        let now = Utc::now();
        let alice = UserId(1);
        assert_eq!(coupons.redeem(coupon.id, dec!(80), alice, now).await.unwrap(), dec!(8));
        let again = coupons.redeem(coupon.id, dec!(80), alice, now).await;
        assert!(matches!(again, Err(CouponError::UserLimitReached(_))));

        coupons.release(coupon.id, alice).await.unwrap();
        coupons.redeem(coupon.id, dec!(80), alice, now).await.unwrap();
        coupons.redeem(coupon.id, dec!(80), UserId(2), now).await.unwrap();
        let exhausted = coupons.validate(coupon.id, dec!(80), Some(UserId(3)), now).await;
        assert!(matches!(exhausted, Err(CouponError::Exhausted(_))));
    }

    #[tokio::test]
    async fn test_codes_are_unique_and_checked() {
        let (actor, coupons) = new(8);
        tokio::spawn(actor.run(()));
        coupons.create_coupon(params("TREES")).await.unwrap();
        assert_eq!(
            coupons.create_coupon(params("trees")).await,
            Err(CouponError::CodeTaken("TREES".to_string()))
        );

        let mut bad = params("BAD");
        bad.kind = CouponKind::Percent(0);
        assert!(matches!(coupons.create_coupon(bad).await, Err(CouponError::Invalid(_))));

        assert_eq!(
            coupons.find_by_code("nope").await,
            Err(CouponError::UnknownCode("NOPE".to_string()))
        );
        assert_eq!(
            coupons.quote("trees", dec!(30), None, Utc::now()).await.unwrap(),
            dec!(3)
        );
        assert_eq!(
            coupons.quote("nope", dec!(30), None, Utc::now()).await.unwrap(),
            Decimal::ZERO
        );
    }
}
