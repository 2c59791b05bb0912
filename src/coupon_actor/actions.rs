//! Custom actions for the Coupon actor.

use crate::model::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Actions on a [`Coupon`](crate::model::Coupon). Each returns a discount amount.
#[derive(Debug, Clone)]
pub enum CouponAction {
    /// Computes the discount without recording a use.
    Validate {
        subtotal: Decimal,
        user: Option<UserId>,
        at: DateTime<Utc>,
    },
    /// Computes the discount and records a use by `user`.
    Redeem {
        subtotal: Decimal,
        user: UserId,
        at: DateTime<Utc>,
    },
    /// Reverts one use by `user` (cancelled order). Returns zero.
    Release { user: UserId },
}
