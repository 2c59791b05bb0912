//! Custom actions for the Order actor.

use chrono::{DateTime, Utc};

/// Status transitions of an [`Order`](crate::model::Order). Each returns the
/// updated order.
///
/// Orders move forward only: `Pending -> Paid -> Shipped -> Delivered`, and
/// `Pending | Paid -> Cancelled`.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Records a confirmed payment and turns reserved stock into sold stock.
    MarkPaid {
        reference: String,
        at: DateTime<Utc>,
    },
    Ship { at: DateTime<Utc> },
    Deliver { at: DateTime<Utc> },
    /// Returns stock (reservations of a pending order, sold units of a paid one)
    /// and releases the coupon redemption.
    Cancel { at: DateTime<Utc> },
}

impl OrderAction {
    pub fn name(&self) -> &'static str {
        match self {
            OrderAction::MarkPaid { .. } => "pay",
            OrderAction::Ship { .. } => "ship",
            OrderAction::Deliver { .. } => "deliver",
            OrderAction::Cancel { .. } => "cancel",
        }
    }
}
