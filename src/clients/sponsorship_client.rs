use crate::codes::{slugify, unique_slug};
use crate::model::{
    Campaign, CampaignCreate, CampaignId, CampaignStatus, Donation, DonationCreate, DonationId,
    Plan, PlanCreate, PlanId, Tree, TreeCreate, TreeId, TreeInstance, TreeInstanceCreate,
    TreeInstanceId, UserId,
};
use crate::sponsorship_actor::{CampaignAction, SponsorshipError, TreeInstanceAction};
use canopy_actors::ActorClient;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

resource_client!(
    /// Client for interacting with the Campaign actor.
    CampaignClient,
    Campaign,
    SponsorshipError
);

impl CampaignClient {
    #[instrument(skip(self, params), fields(title = %params.title))]
    pub async fn create_campaign(
        &self,
        mut params: CampaignCreate,
    ) -> Result<CampaignId, SponsorshipError> {
        let base = params.slug.take().unwrap_or_else(|| slugify(&params.title));
        let existing = self.list().await?;
        params.slug = Some(unique_slug(&base, existing.iter().map(|c| c.slug.as_str())));
        self.inner.create(params).await.map_err(SponsorshipError::from)
    }

    pub async fn require(&self, id: CampaignId) -> Result<Campaign, SponsorshipError> {
        self.get(id)
            .await?
            .ok_or_else(|| SponsorshipError::NotFound(id.to_string()))
    }

    /// Campaigns open to donations.
    pub async fn active(&self) -> Result<Vec<Campaign>, SponsorshipError> {
        let mut campaigns = self.list().await?;
        campaigns.retain(|c| c.status == CampaignStatus::Active);
        Ok(campaigns)
    }

    async fn act(
        &self,
        id: CampaignId,
        action: CampaignAction,
    ) -> Result<Campaign, SponsorshipError> {
        debug!(?action, "Sending campaign action");
        self.inner
            .perform_action(id, action)
            .await
            .map_err(SponsorshipError::from)
    }

    #[instrument(skip(self))]
    pub async fn donate(
        &self,
        id: CampaignId,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Result<Campaign, SponsorshipError> {
        self.act(id, CampaignAction::Donate { amount, at }).await
    }

    #[instrument(skip(self))]
    pub async fn publish(&self, id: CampaignId) -> Result<Campaign, SponsorshipError> {
        self.act(id, CampaignAction::Publish).await
    }

    #[instrument(skip(self))]
    pub async fn close(&self, id: CampaignId) -> Result<Campaign, SponsorshipError> {
        self.act(id, CampaignAction::Close).await
    }
}

resource_client!(
    /// Client for the donation ledger.
    DonationClient,
    Donation,
    SponsorshipError
);

impl DonationClient {
    pub async fn record(&self, params: DonationCreate) -> Result<DonationId, SponsorshipError> {
        self.inner.create(params).await.map_err(SponsorshipError::from)
    }

    pub async fn for_campaign(
        &self,
        campaign: CampaignId,
    ) -> Result<Vec<Donation>, SponsorshipError> {
        let mut donations = self.list().await?;
        donations.retain(|d| d.campaign_id == campaign);
        Ok(donations)
    }
}

resource_client!(
    /// Client for the tree catalog.
    TreeClient,
    Tree,
    SponsorshipError
);

impl TreeClient {
    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_tree(&self, mut params: TreeCreate) -> Result<TreeId, SponsorshipError> {
        let base = params.slug.take().unwrap_or_else(|| slugify(&params.name));
        let existing = self.list().await?;
        params.slug = Some(unique_slug(&base, existing.iter().map(|t| t.slug.as_str())));
        self.inner.create(params).await.map_err(SponsorshipError::from)
    }

    pub async fn require(&self, id: TreeId) -> Result<Tree, SponsorshipError> {
        self.get(id)
            .await?
            .ok_or_else(|| SponsorshipError::NotFound(id.to_string()))
    }
}

resource_client!(
    /// Client for adoption plans.
    PlanClient,
    Plan,
    SponsorshipError
);

impl PlanClient {
    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_plan(&self, mut params: PlanCreate) -> Result<PlanId, SponsorshipError> {
        let base = params.slug.take().unwrap_or_else(|| slugify(&params.name));
        let existing = self.list().await?;
        params.slug = Some(unique_slug(&base, existing.iter().map(|p| p.slug.as_str())));
        self.inner.create(params).await.map_err(SponsorshipError::from)
    }

    pub async fn require(&self, id: PlanId) -> Result<Plan, SponsorshipError> {
        self.get(id)
            .await?
            .ok_or_else(|| SponsorshipError::NotFound(id.to_string()))
    }
}

resource_client!(
    /// Client for planted trees.
    TreeInstanceClient,
    TreeInstance,
    SponsorshipError
);

impl TreeInstanceClient {
    #[instrument(skip(self, params), fields(tree = %params.tree_id))]
    pub async fn create_instance(
        &self,
        params: TreeInstanceCreate,
    ) -> Result<TreeInstanceId, SponsorshipError> {
        self.inner.create(params).await.map_err(SponsorshipError::from)
    }

    pub async fn require(&self, id: TreeInstanceId) -> Result<TreeInstance, SponsorshipError> {
        self.get(id)
            .await?
            .ok_or_else(|| SponsorshipError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn adopt(
        &self,
        id: TreeInstanceId,
        user: UserId,
        plan: PlanId,
        duration_months: u32,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Result<TreeInstance, SponsorshipError> {
        let action = TreeInstanceAction::Adopt {
            user,
            plan,
            duration_months,
            amount,
            at,
        };
        self.inner
            .perform_action(id, action)
            .await
            .map_err(SponsorshipError::from)
    }

    #[instrument(skip(self))]
    pub async fn end_adoption(&self, id: TreeInstanceId) -> Result<TreeInstance, SponsorshipError> {
        self.inner
            .perform_action(id, TreeInstanceAction::EndAdoption)
            .await
            .map_err(SponsorshipError::from)
    }
}
