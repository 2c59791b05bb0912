//! # Order Actor
//!
//! Orders are the one resource with dependencies: its `Context` carries the
//! user, variant and coupon clients (see [`OrderContext`]). Creating an order
//! reserves stock and redeems the coupon; the status actions move stock between
//! reserved, sold and available.
//!
//! ## Dependency Injection
//!
//! ```rust,ignore
//! let (order_actor, orders) = order_actor::new(32);
//! tokio::spawn(order_actor.run(OrderContext {
//!     users: users.clone(),
//!     variants: variants.clone(),
//!     coupons: coupons.clone(),
//! }));
//! ```
//!
//! Tests swap the real clients for [`MockClient`](canopy_actors::mock::MockClient)
//! handles, see `tests/order_actor_test.rs`.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::OrderContext;
pub use error::*;

use crate::clients::OrderClient;
use crate::model::Order;
use canopy_actors::ResourceActor;

/// Creates a new Order actor and its client.
pub fn new(buffer: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, OrderClient::new(client))
}
