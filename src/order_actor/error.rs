//! Error types for the Order actor.

use crate::coupon_actor::CouponError;
use crate::model::OrderStatus;
use canopy_actors::FrameworkError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The order belongs to another user.
    #[error("Order {0} belongs to another user")]
    Forbidden(String),

    /// The user placing the order does not exist or is inactive.
    #[error("Invalid user: {0}")]
    InvalidUser(String),

    /// A line refers to an unknown or inactive variant.
    #[error("Invalid variant: {0}")]
    InvalidVariant(String),

    /// A line asks for more units than the variant has available.
    #[error("Insufficient stock for {variant}: requested {requested}, available {available}")]
    InsufficientStock {
        variant: String,
        requested: u32,
        available: u32,
    },

    /// The coupon on the order could not be applied.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// The order payload is invalid.
    #[error("Invalid order: {0}")]
    Validation(String),

    /// The action is not allowed in the order's current status.
    #[error("Cannot {action} an order that is {from}")]
    InvalidTransition {
        from: OrderStatus,
        action: &'static str,
    },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        match e.downcast_entity::<OrderError>() {
            Ok(err) => err,
            Err(FrameworkError::NotFound(id)) => OrderError::NotFound(id),
            Err(other) => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
