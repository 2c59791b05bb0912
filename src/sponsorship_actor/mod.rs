//! # Sponsorship Actors
//!
//! Campaigns with their donation ledger, the tree catalog, adoption plans and the
//! planted trees that users adopt. Five independent actors without
//! dependencies; [`SponsorshipService`](crate::services::SponsorshipService)
//! combines them (a donation updates the campaign and writes a ledger row, an
//! adoption looks up the plan price).

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::{CampaignClient, DonationClient, PlanClient, TreeClient, TreeInstanceClient};
use crate::model::{Campaign, Donation, Plan, Tree, TreeInstance};
use canopy_actors::ResourceActor;

pub fn new_campaigns(buffer: usize) -> (ResourceActor<Campaign>, CampaignClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, CampaignClient::new(client))
}

pub fn new_donations(buffer: usize) -> (ResourceActor<Donation>, DonationClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, DonationClient::new(client))
}

pub fn new_trees(buffer: usize) -> (ResourceActor<Tree>, TreeClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, TreeClient::new(client))
}

pub fn new_plans(buffer: usize) -> (ResourceActor<Plan>, PlanClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, PlanClient::new(client))
}

pub fn new_tree_instances(buffer: usize) -> (ResourceActor<TreeInstance>, TreeInstanceClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, TreeInstanceClient::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CampaignCreate, CampaignStatus, PlanCreate, PlanId, PlanPrice, TreeCreate,
        TreeInstanceCreate, TreeInstanceStatus, UserId,
    };
    use canopy_actors::ActorClient;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_donations_complete_the_campaign() {
        let (actor, campaigns) = new_campaigns(8);
        tokio::spawn(actor.run(()));
        let now = Utc::now();
        let id = campaigns
            .create_campaign(CampaignCreate {
                title: "Plant a Forest".to_string(),
                slug: None,
                description: None,
                goal_amount: dec!(100),
                starts_at: now - Duration::days(1),
                ends_at: Some(now + Duration::days(30)),
            })
            .await
            .unwrap();

        let early = campaigns.donate(id, dec!(10), now).await;
        assert!(matches!(early, Err(SponsorshipError::CampaignNotActive(_))));

        campaigns.publish(id).await.unwrap();
        assert!(matches!(
            campaigns.donate(id, dec!(0), now).await,
            Err(SponsorshipError::InvalidAmount(_))
        ));
        let campaign = campaigns.donate(id, dec!(60), now).await.unwrap();
        assert_eq!(campaign.status, CampaignStatus::Active);
        let campaign = campaigns.donate(id, dec!(40), now).await.unwrap();
        assert_eq!(campaign.status, CampaignStatus::Completed);
        assert_eq!(campaign.donor_count, 2);
        assert_eq!(campaign.raised_amount, dec!(100));

        let late = campaigns.donate(id, dec!(5), now + Duration::days(31)).await;
        assert!(matches!(late, Err(SponsorshipError::CampaignNotActive(_))));
    }

    #[tokio::test]
    async fn test_overflowing_donation_is_rejected() {
        let (actor, campaigns) = new_campaigns(8);
        tokio::spawn(actor.run(()));
        let now = Utc::now();
        let id = campaigns
            .create_campaign(CampaignCreate {
                title: "Endless Grove".to_string(),
                slug: None,
                description: None,
                goal_amount: rust_decimal::Decimal::MAX,
                starts_at: now - Duration::days(1),
                ends_at: None,
            })
            .await
            .unwrap();
        campaigns.publish(id).await.unwrap();
        campaigns.donate(id, dec!(1), now).await.unwrap();

        let overflow = campaigns.donate(id, rust_decimal::Decimal::MAX, now).await;
        assert!(matches!(overflow, Err(SponsorshipError::InvalidAmount(_))));

        let campaign = campaigns.donate(id, dec!(1), now).await.unwrap();
        assert_eq!(campaign.raised_amount, dec!(2));
        assert_eq!(campaign.donor_count, 2);
    }

    #[tokio::test]
    async fn test_adoption_runs_for_the_plan_duration() {
        let (actor, trees) = new_trees(8);
        tokio::spawn(actor.run(()));
        let (actor, instances) = new_tree_instances(8);
        tokio::spawn(actor.run(()));

        let tree_id = trees
            .create_tree(TreeCreate {
                name: "Neem".to_string(),
                slug: None,
                scientific_name: Some("Azadirachta indica".to_string()),
                description: None,
            })
            .await
            .unwrap();
        let tree = trees.get(tree_id).await.unwrap().unwrap();
        assert_eq!(tree.sku, "NXX-00001");

        let id = instances
            .create_instance(TreeInstanceCreate {
                tree_id,
                tree_sku: tree.sku,
                location_id: None,
                planted_at: None,
            })
            .await
            .unwrap();

        let start = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let adopted = instances
            .adopt(id, UserId(1), PlanId(1), 1, dec!(30), start)
            .await
            .unwrap();
        assert_eq!(adopted.code, "NXX-00001-T0001");
        assert_eq!(adopted.status, TreeInstanceStatus::Adopted);
        let adoption = adopted.adoption.unwrap();
        assert_eq!(adoption.expires_at, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());

        let again = instances.adopt(id, UserId(2), PlanId(1), 12, dec!(300), start).await;
        assert_eq!(again, Err(SponsorshipError::AlreadyAdopted("NXX-00001-T0001".to_string())));

        instances.end_adoption(id).await.unwrap();
        assert!(matches!(
            instances.end_adoption(id).await,
            Err(SponsorshipError::NotAdopted(_))
        ));
    }

    #[tokio::test]
    async fn test_plan_prices_are_checked() {
        let (actor, plans) = new_plans(8);
        tokio::spawn(actor.run(()));
        let twice = PlanCreate {
            name: "Yearly adoption".to_string(),
            slug: None,
            description: None,
            prices: vec![
                PlanPrice { duration_months: 12, amount: dec!(120) },
                PlanPrice { duration_months: 12, amount: dec!(100) },
            ],
        };
        assert!(matches!(plans.create_plan(twice).await, Err(SponsorshipError::Invalid(_))));

        let id = plans
            .create_plan(PlanCreate {
                name: "Yearly adoption".to_string(),
                slug: None,
                description: None,
                prices: vec![
                    PlanPrice { duration_months: 6, amount: dec!(65) },
                    PlanPrice { duration_months: 12, amount: dec!(120) },
                ],
            })
            .await
            .unwrap();
        let plan = plans.get(id).await.unwrap().unwrap();
        assert_eq!(plan.slug, "yearly-adoption");
        assert_eq!(plan.price_for(12), Some(dec!(120)));
        assert_eq!(plan.price_for(3), None);
    }
}
