//! Campaign donations and tree adoption.

use crate::clients::{CampaignClient, DonationClient, PlanClient, TreeClient, TreeInstanceClient};
use crate::jobs::{Job, JobQueue};
use crate::model::{
    Campaign, CampaignCreate, CampaignId, DonationCreate, LocationId, Plan, PlanCreate, PlanId,
    Tree, TreeCreate, TreeId, TreeInstance, TreeInstanceCreate, TreeInstanceId, UserId,
};
use crate::notifications::PushMessage;
use crate::sponsorship_actor::SponsorshipError;
use canopy_actors::ActorClient;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct SponsorshipService {
    campaigns: CampaignClient,
    donations: DonationClient,
    trees: TreeClient,
    plans: PlanClient,
    instances: TreeInstanceClient,
    jobs: JobQueue,
}

impl SponsorshipService {
    pub fn new(
        campaigns: CampaignClient,
        donations: DonationClient,
        trees: TreeClient,
        plans: PlanClient,
        instances: TreeInstanceClient,
        jobs: JobQueue,
    ) -> Self {
        Self {
            campaigns,
            donations,
            trees,
            plans,
            instances,
            jobs,
        }
    }

    pub async fn create_campaign(&self, params: CampaignCreate) -> Result<Campaign, SponsorshipError> {
        let id = self.campaigns.create_campaign(params).await?;
        self.campaigns.require(id).await
    }

    pub async fn publish_campaign(&self, id: CampaignId) -> Result<Campaign, SponsorshipError> {
        self.campaigns.publish(id).await
    }

    pub async fn close_campaign(&self, id: CampaignId) -> Result<Campaign, SponsorshipError> {
        self.campaigns.close(id).await
    }

    pub async fn active_campaigns(&self) -> Result<Vec<Campaign>, SponsorshipError> {
        self.campaigns.active().await
    }

    /// Adds a donation to the campaign and writes it to the donation ledger.
    #[instrument(skip(self))]
    pub async fn donate(
        &self,
        id: CampaignId,
        user: Option<UserId>,
        amount: Decimal,
    ) -> Result<Campaign, SponsorshipError> {
        let at = Utc::now();
        let campaign = self.campaigns.donate(id, amount, at).await?;
        self.donations
            .record(DonationCreate {
                campaign_id: id,
                user_id: user,
                amount,
                donated_at: at,
            })
            .await?;
        if let Some(user) = user {
            let message = PushMessage::new(
                "Thank you for your donation",
                format!("You gave {amount} to {}.", campaign.title),
            )
            .with_data("campaign_id", id.0.to_string());
            self.jobs.dispatch(Job::NotifyUser { user, message });
        }
        Ok(campaign)
    }

    pub async fn create_tree(&self, params: TreeCreate) -> Result<Tree, SponsorshipError> {
        let id = self.trees.create_tree(params).await?;
        self.trees.require(id).await
    }

    /// Active species, in creation order.
    pub async fn list_trees(&self) -> Result<Vec<Tree>, SponsorshipError> {
        let mut trees = self.trees.list().await?;
        trees.retain(|t| t.is_active);
        Ok(trees)
    }

    pub async fn create_plan(&self, params: PlanCreate) -> Result<Plan, SponsorshipError> {
        let id = self.plans.create_plan(params).await?;
        self.plans.require(id).await
    }

    /// Plants a tree of species `tree`; its code is derived from the species SKU.
    pub async fn plant_tree(
        &self,
        tree: TreeId,
        location: Option<LocationId>,
        planted_at: Option<DateTime<Utc>>,
    ) -> Result<TreeInstance, SponsorshipError> {
        let tree = self.trees.require(tree).await?;
        let id = self
            .instances
            .create_instance(TreeInstanceCreate {
                tree_id: tree.id,
                tree_sku: tree.sku,
                location_id: location,
                planted_at,
            })
            .await?;
        self.instances.require(id).await
    }

    /// Adopts a planted tree for `duration_months` at the plan's price for that
    /// duration.
    #[instrument(skip(self))]
    pub async fn adopt(
        &self,
        instance: TreeInstanceId,
        user: UserId,
        plan: PlanId,
        duration_months: u32,
    ) -> Result<TreeInstance, SponsorshipError> {
        let plan = self.plans.require(plan).await?;
        if !plan.is_active {
            return Err(SponsorshipError::Invalid(format!(
                "plan {} is not available",
                plan.slug
            )));
        }
        let amount = plan.price_for(duration_months).ok_or_else(|| {
            SponsorshipError::NoPriceForDuration {
                plan: plan.slug.clone(),
                months: duration_months,
            }
        })?;
        let adopted = self
            .instances
            .adopt(instance, user, plan.id, duration_months, amount, Utc::now())
            .await?;
        info!(tree = %adopted.code, %user, %amount, "Tree adopted");
        match &adopted.adoption {
            Some(adoption) => {
                let message = PushMessage::new(
                    "Your tree is adopted",
                    format!(
                        "Tree {} is yours until {}.",
                        adopted.code,
                        adoption.expires_at.format("%Y-%m-%d")
                    ),
                )
                .with_data("tree_instance_id", adopted.id.0.to_string());
                self.jobs.dispatch(Job::NotifyUser { user, message });
            }
            None => warn!(tree = %adopted.code, "Adopted tree has no adoption record"),
        }
        Ok(adopted)
    }
}
