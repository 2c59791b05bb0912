use crate::auth::{AuthService, OtpService, TokenStore};
use crate::clients::{
    AttributeClient, CampaignClient, CouponClient, DonationClient, FcmTokenClient,
    LocationClient, NotificationClient, OrderClient, PlanClient, ProductClient, TreeClient,
    TreeInstanceClient, UserClient, VariantClient,
};
use crate::config::{AppConfig, ConfigError, Providers};
use crate::jobs::{JobContext, JobQueue, JobWorker};
use crate::model::{ColorKind, PlanterKind, SizeKind};
use crate::notifications::Notifier;
use crate::order_actor::OrderContext;
use crate::services::{
    CatalogService, CheckoutService, LocationService, NotificationService, OpenIntents,
    OrderService, SponsorshipService,
};
use crate::{
    catalog_actor, coupon_actor, location_actor, notification_actor, order_actor,
    sponsorship_actor, user_actor,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Clients of every resource actor.
#[derive(Clone)]
pub struct Clients {
    pub users: UserClient,
    pub products: ProductClient,
    pub variants: VariantClient,
    pub sizes: AttributeClient<SizeKind>,
    pub colors: AttributeClient<ColorKind>,
    pub planters: AttributeClient<PlanterKind>,
    pub coupons: CouponClient,
    pub orders: OrderClient,
    pub campaigns: CampaignClient,
    pub donations: DonationClient,
    pub trees: TreeClient,
    pub plans: PlanClient,
    pub tree_instances: TreeInstanceClient,
    pub locations: LocationClient,
    pub notifications: NotificationClient,
    pub fcm_tokens: FcmTokenClient,
}

/// Everything the HTTP layer calls.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub coupons: CouponClient,
    pub orders: OrderService,
    pub checkout: CheckoutService,
    pub sponsorship: SponsorshipService,
    pub locations: LocationService,
    pub notifications: NotificationService,
    pub notifier: Notifier,
}

/// The running system: resource actors, the job worker and the services.
///
/// # Example
///
/// ```ignore
/// let platform = Platform::start(&config)?;
/// let product = platform.services.catalog.create_product(params).await?;
/// platform.jobs.flush().await;
/// platform.shutdown().await?;
/// ```
pub struct Platform {
    pub clients: Clients,
    pub services: Services,
    pub jobs: JobQueue,
    handles: Vec<JoinHandle<()>>,
    worker: JoinHandle<()>,
}

impl Platform {
    /// Starts the platform with the providers named in `config`.
    pub fn start(config: &AppConfig) -> Result<Self, ConfigError> {
        let providers = Providers::from_config(config)?;
        Ok(Self::with_providers(config, providers))
    }

    /// Starts the platform with the given outbound adapters.
    pub fn with_providers(config: &AppConfig, providers: Providers) -> Self {
        let buffer = config.actor_buffer;

        // 1. Actors and their clients
        let (user_actor, users) = user_actor::new(buffer);
        let (product_actor, products) = catalog_actor::new_products(buffer);
        let (variant_actor, variants) = catalog_actor::new_variants(buffer);
        let (size_actor, sizes) = catalog_actor::new_attributes::<SizeKind>(buffer);
        let (color_actor, colors) = catalog_actor::new_attributes::<ColorKind>(buffer);
        let (planter_actor, planters) = catalog_actor::new_attributes::<PlanterKind>(buffer);
        let (coupon_actor, coupons) = coupon_actor::new(buffer);
        let (order_actor, orders) = order_actor::new(buffer);
        let (campaign_actor, campaigns) = sponsorship_actor::new_campaigns(buffer);
        let (donation_actor, donations) = sponsorship_actor::new_donations(buffer);
        let (tree_actor, trees) = sponsorship_actor::new_trees(buffer);
        let (plan_actor, plans) = sponsorship_actor::new_plans(buffer);
        let (instance_actor, tree_instances) = sponsorship_actor::new_tree_instances(buffer);
        let (location_actor, locations) = location_actor::new(buffer);
        let (notification_actor, notifications) = notification_actor::new_notifications(buffer);
        let (token_actor, fcm_tokens) = notification_actor::new_fcm_tokens(buffer);

        // 2. Start them; only orders have dependencies
        let order_context = OrderContext {
            users: users.clone(),
            variants: variants.clone(),
            coupons: coupons.clone(),
        };
        let handles = vec![
            tokio::spawn(user_actor.run(())),
            tokio::spawn(product_actor.run(())),
            tokio::spawn(variant_actor.run(())),
            tokio::spawn(size_actor.run(())),
            tokio::spawn(color_actor.run(())),
            tokio::spawn(planter_actor.run(())),
            tokio::spawn(coupon_actor.run(())),
            tokio::spawn(order_actor.run(order_context)),
            tokio::spawn(campaign_actor.run(())),
            tokio::spawn(donation_actor.run(())),
            tokio::spawn(tree_actor.run(())),
            tokio::spawn(plan_actor.run(())),
            tokio::spawn(instance_actor.run(())),
            tokio::spawn(location_actor.run(())),
            tokio::spawn(notification_actor.run(())),
            tokio::spawn(token_actor.run(())),
        ];

        // 3. Services, then the job worker that runs their follow-up work
        let (worker, jobs) = JobWorker::new();
        let notifier = Notifier::new(
            users.clone(),
            fcm_tokens.clone(),
            notifications.clone(),
            providers.push.clone(),
            providers.sms.clone(),
        );
        let otp = Arc::new(OtpService::new(config.otp.clone(), providers.sms.clone()));
        let intents = OpenIntents::new();
        let services = Services {
            auth: AuthService::new(
                users.clone(),
                fcm_tokens.clone(),
                otp,
                Arc::new(TokenStore::new()),
            ),
            catalog: CatalogService::new(
                products.clone(),
                variants.clone(),
                sizes.clone(),
                colors.clone(),
                planters.clone(),
                jobs.clone(),
            ),
            coupons: coupons.clone(),
            orders: OrderService::new(
                orders.clone(),
                coupons.clone(),
                intents.clone(),
                jobs.clone(),
            ),
            checkout: CheckoutService::new(
                orders.clone(),
                providers.payments.clone(),
                config.currency.clone(),
                intents,
                jobs.clone(),
            ),
            sponsorship: SponsorshipService::new(
                campaigns.clone(),
                donations.clone(),
                trees.clone(),
                plans.clone(),
                tree_instances.clone(),
                jobs.clone(),
            ),
            locations: LocationService::new(
                locations.clone(),
                providers.geocoder.clone(),
                jobs.clone(),
            ),
            notifications: NotificationService::new(notifications.clone(), jobs.clone()),
            notifier: notifier.clone(),
        };
        let worker = tokio::spawn(worker.run(JobContext {
            catalog: services.catalog.clone(),
            locations: services.locations.clone(),
            notifier,
        }));
        info!(actors = handles.len(), "Platform started");

        Self {
            clients: Clients {
                users,
                products,
                variants,
                sizes,
                colors,
                planters,
                coupons,
                orders,
                campaigns,
                donations,
                trees,
                plans,
                tree_instances,
                locations,
                notifications,
                fcm_tokens,
            },
            services,
            jobs,
            handles,
            worker,
        }
    }

    /// Stops the job worker, then every actor.
    ///
    /// Jobs queued before the call still run. Actors stop once all clients of
    /// their channel are gone, so every service and client clone handed out
    /// (for example to an HTTP server) must be dropped first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down platform...");
        self.jobs.shutdown();
        if let Err(e) = self.worker.await {
            error!("Job worker failed: {:?}", e);
            return Err(format!("Job worker failed: {:?}", e));
        }

        drop(self.services);
        drop(self.clients);
        drop(self.jobs);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }
        info!("Platform shutdown complete.");
        Ok(())
    }
}
