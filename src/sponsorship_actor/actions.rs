//! Custom actions for campaigns and planted trees.

use crate::model::{PlanId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Actions on a [`Campaign`](crate::model::Campaign). Each returns the campaign.
#[derive(Debug, Clone)]
pub enum CampaignAction {
    /// Adds a donation to the raised amount. Reaching the goal completes the
    /// campaign.
    Donate { amount: Decimal, at: DateTime<Utc> },
    /// Draft -> Active.
    Publish,
    /// Stops accepting donations.
    Close,
}

/// Actions on a [`TreeInstance`](crate::model::TreeInstance). Each returns the
/// tree instance.
#[derive(Debug, Clone)]
pub enum TreeInstanceAction {
    /// Available -> Adopted, for `duration_months` starting at `at`.
    Adopt {
        user: UserId,
        plan: PlanId,
        duration_months: u32,
        amount: Decimal,
        at: DateTime<Utc>,
    },
    /// Adopted -> Available.
    EndAdoption,
}
