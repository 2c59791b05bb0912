//! Campaigns and donations, the tree catalog, adoption plans and planted trees.

use super::{CampaignId, DonationId, LocationId, PlanId, TreeId, TreeInstanceId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// CAMPAIGNS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Completed,
    Closed,
}

/// A fundraising campaign. Donations move `raised_amount` towards `goal_amount`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub goal_amount: Decimal,
    pub raised_amount: Decimal,
    pub donor_count: u32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CampaignCreate {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct CampaignUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Option<Decimal>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// One recorded donation. Donations are immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Donation {
    pub id: DonationId,
    pub campaign_id: CampaignId,
    pub user_id: Option<UserId>,
    pub amount: Decimal,
    pub donated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DonationCreate {
    pub campaign_id: CampaignId,
    pub user_id: Option<UserId>,
    pub amount: Decimal,
    pub donated_at: DateTime<Utc>,
}

// =============================================================================
// TREES AND PLANS
// =============================================================================

/// A species in the tree catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tree {
    pub id: TreeId,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct TreeCreate {
    pub name: String,
    pub slug: Option<String>,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TreeUpdate {
    pub name: Option<String>,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPrice {
    pub duration_months: u32,
    pub amount: Decimal,
}

/// An adoption plan, priced per duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub prices: Vec<PlanPrice>,
    pub is_active: bool,
}

impl Plan {
    pub fn price_for(&self, duration_months: u32) -> Option<Decimal> {
        self.prices
            .iter()
            .find(|p| p.duration_months == duration_months)
            .map(|p| p.amount)
    }
}

#[derive(Debug, Clone)]
pub struct PlanCreate {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub prices: Vec<PlanPrice>,
}

#[derive(Debug, Clone, Default)]
pub struct PlanUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub prices: Option<Vec<PlanPrice>>,
    pub is_active: Option<bool>,
}

// =============================================================================
// PLANTED TREES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeInstanceStatus {
    Available,
    Adopted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adoption {
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub duration_months: u32,
    pub amount: Decimal,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A concrete planted tree that can be adopted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeInstance {
    pub id: TreeInstanceId,
    pub tree_id: TreeId,
    pub location_id: Option<LocationId>,
    pub code: String,
    pub planted_at: Option<DateTime<Utc>>,
    pub status: TreeInstanceStatus,
    pub adoption: Option<Adoption>,
}

/// `tree_sku` is resolved from the tree by the caller and seeds the instance code.
#[derive(Debug, Clone)]
pub struct TreeInstanceCreate {
    pub tree_id: TreeId,
    pub tree_sku: String,
    pub location_id: Option<LocationId>,
    pub planted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct TreeInstanceUpdate {
    pub location_id: Option<LocationId>,
    pub planted_at: Option<DateTime<Utc>>,
}
