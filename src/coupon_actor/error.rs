//! Error types for the Coupon actor.

use canopy_actors::FrameworkError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during coupon operations.
///
/// The usability variants (`Inactive` through `BelowMinimum`) come from
/// [`Coupon::discount_for`](crate::model::Coupon::discount_for).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CouponError {
    /// The requested coupon was not found.
    #[error("Coupon not found: {0}")]
    NotFound(String),

    /// No coupon has this code.
    #[error("The coupon code {0} is invalid.")]
    UnknownCode(String),

    /// The coupon definition is invalid.
    #[error("Invalid coupon: {0}")]
    Invalid(String),

    /// Another coupon already uses this code.
    #[error("Coupon code already exists: {0}")]
    CodeTaken(String),

    #[error("The coupon {0} is not active.")]
    Inactive(String),

    #[error("The coupon {0} is not valid yet.")]
    NotStarted(String),

    #[error("The coupon {0} has expired.")]
    Expired(String),

    #[error("The coupon {0} has reached its usage limit.")]
    Exhausted(String),

    #[error("You have already used the coupon {0}.")]
    UserLimitReached(String),

    #[error("The order subtotal must be at least {minimum} to use this coupon.")]
    BelowMinimum { minimum: Decimal },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for CouponError {
    fn from(e: FrameworkError) -> Self {
        match e.downcast_entity::<CouponError>() {
            Ok(err) => err,
            Err(FrameworkError::NotFound(id)) => CouponError::NotFound(id),
            Err(FrameworkError::Conflict(code)) => CouponError::CodeTaken(code),
            Err(other) => CouponError::ActorCommunicationError(other.to_string()),
        }
    }
}
