//! # Resource Clients
//!
//! Typed wrappers around `ResourceClient<T>`: each exposes domain methods
//! (`create_product`, `reserve_stock`, `redeem`, ...) returning the actor's own
//! error type, and gets `get`/`list`/`delete` from
//! [`ActorClient`](canopy_actors::ActorClient).
//!
//! Slug uniqueness is settled here: a client lists the existing slugs and picks
//! the first free one before it asks the actor to create the record. The actor's
//! unique key check still rejects a slug taken in between.

/// Declares a client struct wrapping `ResourceClient<$entity>` and implements
/// `ActorClient` for it.
macro_rules! resource_client {
    ($(#[$meta:meta])* $client:ident, $entity:ty, $error:ty) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $client {
            inner: canopy_actors::ResourceClient<$entity>,
        }

        impl $client {
            pub fn new(inner: canopy_actors::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }

        #[async_trait::async_trait]
        impl canopy_actors::ActorClient<$entity> for $client {
            type Error = $error;

            fn inner(&self) -> &canopy_actors::ResourceClient<$entity> {
                &self.inner
            }

            fn map_error(e: canopy_actors::FrameworkError) -> Self::Error {
                e.into()
            }
        }
    };
}

mod catalog_client;
mod coupon_client;
mod location_client;
mod notification_client;
mod order_client;
mod sponsorship_client;
mod user_client;

pub use catalog_client::{AttributeClient, ProductClient, VariantClient};
pub use coupon_client::CouponClient;
pub use location_client::LocationClient;
pub use notification_client::{FcmTokenClient, NotificationClient};
pub use order_client::OrderClient;
pub use sponsorship_client::{
    CampaignClient, DonationClient, PlanClient, TreeClient, TreeInstanceClient,
};
pub use user_client::UserClient;
