//! ActorEntity implementations for campaigns, donations, trees, plans and
//! planted trees.

use super::{CampaignAction, SponsorshipError, TreeInstanceAction};
use crate::codes::{instance_code, product_sku, slugify};
use crate::model::{
    Adoption, Campaign, CampaignCreate, CampaignId, CampaignStatus, CampaignUpdate, Donation,
    DonationCreate, DonationId, Plan, PlanCreate, PlanId, PlanPrice, PlanUpdate, Tree,
    TreeCreate, TreeId, TreeInstance, TreeInstanceCreate, TreeInstanceId, TreeInstanceStatus,
    TreeInstanceUpdate, TreeUpdate,
};
use async_trait::async_trait;
use canopy_actors::ActorEntity;
use chrono::{Months, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::convert::Infallible;
use tracing::info;

fn required(field: &str, value: &str) -> Result<String, SponsorshipError> {
    let value = value.trim();
    if value.is_empty() {
        Err(SponsorshipError::Invalid(format!("{field} is required")))
    } else {
        Ok(value.to_string())
    }
}

fn positive(amount: Decimal) -> Result<Decimal, SponsorshipError> {
    if amount > Decimal::ZERO {
        Ok(amount)
    } else {
        Err(SponsorshipError::InvalidAmount(amount))
    }
}

// =============================================================================
// CAMPAIGNS AND DONATIONS
// =============================================================================

#[async_trait]
impl ActorEntity for Campaign {
    type Id = CampaignId;
    type Create = CampaignCreate;
    type Update = CampaignUpdate;
    type Action = CampaignAction;
    type ActionResult = Campaign;
    type Context = ();
    type Error = SponsorshipError;

    fn from_create_params(id: CampaignId, params: CampaignCreate) -> Result<Self, Self::Error> {
        let title = required("title", &params.title)?;
        if params.ends_at.is_some_and(|ends| ends <= params.starts_at) {
            return Err(SponsorshipError::Invalid(
                "the campaign must end after it starts".to_string(),
            ));
        }
        Ok(Self {
            id,
            slug: params.slug.unwrap_or_else(|| slugify(&title)),
            title,
            description: params.description,
            goal_amount: positive(params.goal_amount)?,
            raised_amount: Decimal::ZERO,
            donor_count: 0,
            starts_at: params.starts_at,
            ends_at: params.ends_at,
            status: CampaignStatus::Draft,
            created_at: Utc::now(),
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.slug.clone())
    }

    async fn on_update(&mut self, update: CampaignUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(title) = update.title {
            self.title = required("title", &title)?;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if let Some(goal) = update.goal_amount {
            self.goal_amount = positive(goal)?;
        }
        if let Some(ends) = update.ends_at {
            if ends <= self.starts_at {
                return Err(SponsorshipError::Invalid(
                    "the campaign must end after it starts".to_string(),
                ));
            }
            self.ends_at = Some(ends);
        }
        Ok(())
    }

    /// # Actions
    /// - `Donate`: amount > 0, campaign Active and inside its window
    /// - `Publish`: Draft only
    /// - `Close`: any status; closing twice is a no-op
    async fn handle_action(
        &mut self,
        action: CampaignAction,
        _ctx: &(),
    ) -> Result<Campaign, Self::Error> {
        match action {
            CampaignAction::Donate { amount, at } => {
                let amount = positive(amount)?;
                if self.status != CampaignStatus::Active || at < self.starts_at {
                    return Err(SponsorshipError::CampaignNotActive(self.slug.clone()));
                }
                if self.ends_at.is_some_and(|ends| at >= ends) {
                    return Err(SponsorshipError::CampaignEnded(self.slug.clone()));
                }
                self.raised_amount = self
                    .raised_amount
                    .checked_add(amount)
                    .ok_or(SponsorshipError::InvalidAmount(amount))?;
                self.donor_count = self.donor_count.saturating_add(1);
                if self.raised_amount >= self.goal_amount {
                    info!(campaign = %self.id, raised = %self.raised_amount, "Campaign goal reached");
                    self.status = CampaignStatus::Completed;
                }
            }
            CampaignAction::Publish => {
                if self.status != CampaignStatus::Draft {
                    return Err(SponsorshipError::Invalid(format!(
                        "only draft campaigns can be published, {} is {:?}",
                        self.slug, self.status
                    )));
                }
                self.status = CampaignStatus::Active;
            }
            CampaignAction::Close => {
                self.status = CampaignStatus::Closed;
            }
        }
        Ok(self.clone())
    }
}

#[async_trait]
impl ActorEntity for Donation {
    type Id = DonationId;
    type Create = DonationCreate;
    type Update = Infallible;
    type Action = Infallible;
    type ActionResult = ();
    type Context = ();
    type Error = SponsorshipError;

    fn from_create_params(id: DonationId, params: DonationCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            campaign_id: params.campaign_id,
            user_id: params.user_id,
            amount: positive(params.amount)?,
            donated_at: params.donated_at,
        })
    }

    async fn on_update(&mut self, update: Infallible, _ctx: &()) -> Result<(), Self::Error> {
        match update {}
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), Self::Error> {
        match action {}
    }
}

// =============================================================================
// TREES AND PLANS
// =============================================================================

#[async_trait]
impl ActorEntity for Tree {
    type Id = TreeId;
    type Create = TreeCreate;
    type Update = TreeUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Context = ();
    type Error = SponsorshipError;

    fn from_create_params(id: TreeId, params: TreeCreate) -> Result<Self, Self::Error> {
        let name = required("name", &params.name)?;
        Ok(Self {
            id,
            slug: params.slug.unwrap_or_else(|| slugify(&name)),
            sku: product_sku(&name, id.0),
            name,
            scientific_name: params.scientific_name,
            description: params.description,
            is_active: true,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.slug.clone())
    }

    async fn on_update(&mut self, update: TreeUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = required("name", &name)?;
        }
        if update.scientific_name.is_some() {
            self.scientific_name = update.scientific_name;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), Self::Error> {
        match action {}
    }
}

/// Prices must be positive and name each duration once.
fn check_prices(prices: &[PlanPrice]) -> Result<(), SponsorshipError> {
    if prices.is_empty() {
        return Err(SponsorshipError::Invalid(
            "a plan needs at least one price".to_string(),
        ));
    }
    let mut durations = HashSet::new();
    for price in prices {
        if price.duration_months == 0 {
            return Err(SponsorshipError::Invalid(
                "durations must be at least one month".to_string(),
            ));
        }
        positive(price.amount)?;
        if !durations.insert(price.duration_months) {
            return Err(SponsorshipError::Invalid(format!(
                "duration of {} months is priced twice",
                price.duration_months
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for Plan {
    type Id = PlanId;
    type Create = PlanCreate;
    type Update = PlanUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Context = ();
    type Error = SponsorshipError;

    fn from_create_params(id: PlanId, params: PlanCreate) -> Result<Self, Self::Error> {
        let name = required("name", &params.name)?;
        check_prices(&params.prices)?;
        Ok(Self {
            id,
            slug: params.slug.unwrap_or_else(|| slugify(&name)),
            name,
            description: params.description,
            prices: params.prices,
            is_active: true,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.slug.clone())
    }

    async fn on_update(&mut self, update: PlanUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = required("name", &name)?;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if let Some(prices) = update.prices {
            check_prices(&prices)?;
            self.prices = prices;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), Self::Error> {
        match action {}
    }
}

// =============================================================================
// PLANTED TREES
// =============================================================================

#[async_trait]
impl ActorEntity for TreeInstance {
    type Id = TreeInstanceId;
    type Create = TreeInstanceCreate;
    type Update = TreeInstanceUpdate;
    type Action = TreeInstanceAction;
    type ActionResult = TreeInstance;
    type Context = ();
    type Error = SponsorshipError;

    fn from_create_params(
        id: TreeInstanceId,
        params: TreeInstanceCreate,
    ) -> Result<Self, Self::Error> {
        let tree_sku = required("tree_sku", &params.tree_sku)?;
        Ok(Self {
            id,
            tree_id: params.tree_id,
            location_id: params.location_id,
            code: instance_code(&tree_sku, id.0),
            planted_at: params.planted_at,
            status: TreeInstanceStatus::Available,
            adoption: None,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.code.clone())
    }

    async fn on_update(&mut self, update: TreeInstanceUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if update.location_id.is_some() {
            self.location_id = update.location_id;
        }
        if update.planted_at.is_some() {
            self.planted_at = update.planted_at;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: TreeInstanceAction,
        _ctx: &(),
    ) -> Result<TreeInstance, Self::Error> {
        match action {
            TreeInstanceAction::Adopt {
                user,
                plan,
                duration_months,
                amount,
                at,
            } => {
                if self.status == TreeInstanceStatus::Adopted {
                    return Err(SponsorshipError::AlreadyAdopted(self.code.clone()));
                }
                if duration_months == 0 {
                    return Err(SponsorshipError::Invalid(
                        "adoptions last at least one month".to_string(),
                    ));
                }
                let expires_at = at
                    .checked_add_months(Months::new(duration_months))
                    .ok_or_else(|| SponsorshipError::Invalid("adoption end is out of range".to_string()))?;
                self.status = TreeInstanceStatus::Adopted;
                self.adoption = Some(Adoption {
                    user_id: user,
                    plan_id: plan,
                    duration_months,
                    amount,
                    started_at: at,
                    expires_at,
                });
            }
            TreeInstanceAction::EndAdoption => {
                if self.status != TreeInstanceStatus::Adopted {
                    return Err(SponsorshipError::NotAdopted(self.code.clone()));
                }
                self.status = TreeInstanceStatus::Available;
                self.adoption = None;
            }
        }
        Ok(self.clone())
    }
}
