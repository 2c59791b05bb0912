//! # Canopy Actors
//!
//! A small resource-oriented actor runtime. Every stored resource type (users,
//! products, orders, coupons, ...) is owned by one [`ResourceActor`] running in its
//! own Tokio task; everything else talks to it through a cloneable
//! [`ResourceClient`].
//!
//! ## Layers
//!
//! 1. **Entity** ([`ActorEntity`]): the record, its payload types and its lifecycle
//!    hooks. Business rules that concern a single record live here.
//! 2. **Runtime** ([`ResourceActor`]): id allocation, the ordered store, uniqueness
//!    checks and sequential message processing.
//! 3. **Interface** ([`ResourceClient`], [`ActorClient`]): typed request/response
//!    over mpsc + oneshot channels.
//!
//! Because one actor handles one message at a time, a read-modify-write on a single
//! record (reserving stock, redeeming a coupon) is atomic without locks.
//!
//! ## Context Injection
//!
//! Dependencies are injected when the actor starts, not when it is built:
//!
//! ```rust
//! use canopy_actors::{ActorEntity, ResourceActor, ResourceClient};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Variant { id: u32, stock: u32 }
//! #[derive(Debug)] struct VariantCreate { stock: u32 }
//! #[derive(Debug)] struct VariantUpdate;
//! #[derive(Debug)] enum VariantAction { Reserve(u32) }
//! #[derive(Debug, thiserror::Error)] #[error("out of stock")] struct OutOfStock;
//!
//! #[async_trait]
//! impl ActorEntity for Variant {
//!     type Id = u32; type Create = VariantCreate; type Update = VariantUpdate;
//!     type Action = VariantAction; type ActionResult = u32; type Context = (); type Error = OutOfStock;
//!     fn from_create_params(id: u32, p: VariantCreate) -> Result<Self, OutOfStock> { Ok(Self { id, stock: p.stock }) }
//!     async fn on_update(&mut self, _: VariantUpdate, _: &()) -> Result<(), OutOfStock> { Ok(()) }
//!     async fn handle_action(&mut self, action: VariantAction, _: &()) -> Result<u32, OutOfStock> {
//!         match action {
//!             VariantAction::Reserve(qty) => {
//!                 self.stock = self.stock.checked_sub(qty).ok_or(OutOfStock)?;
//!                 Ok(self.stock)
//!             }
//!         }
//!     }
//! }
//!
//! #[derive(Clone, Debug)] struct Cart { id: u32 }
//! #[derive(Debug)] struct CartCreate { variant: u32, qty: u32 }
//! #[derive(Debug)] struct CartUpdate;
//! #[derive(Debug)] enum CartAction {}
//! #[derive(Debug, thiserror::Error)] #[error("{0}")] struct CartError(String);
//!
//! #[async_trait]
//! impl ActorEntity for Cart {
//!     type Id = u32; type Create = CartCreate; type Update = CartUpdate;
//!     type Action = CartAction; type ActionResult = (); type Error = CartError;
//!     // The cart actor reaches the variant actor through its context.
//!     type Context = ResourceClient<Variant>;
//!
//!     fn from_create_params(id: u32, _: CartCreate) -> Result<Self, CartError> { Ok(Self { id }) }
//!     async fn on_update(&mut self, _: CartUpdate, _: &Self::Context) -> Result<(), CartError> { Ok(()) }
//!     async fn handle_action(&mut self, _: CartAction, _: &Self::Context) -> Result<(), CartError> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (variant_actor, variants) = ResourceActor::<Variant>::new(10);
//!     let (cart_actor, _carts) = ResourceActor::<Cart>::new(10);
//!     tokio::spawn(variant_actor.run(()));
//!     tokio::spawn(cart_actor.run(variants.clone()));
//!
//!     let id = variants.create(VariantCreate { stock: 3 }).await.unwrap();
//!     assert_eq!(variants.perform_action(id, VariantAction::Reserve(2)).await.unwrap(), 1);
//!     assert!(variants.perform_action(id, VariantAction::Reserve(2)).await.is_err());
//! }
//! ```
//!
//! ## Errors
//!
//! Hook errors cross the channel boxed inside [`FrameworkError::EntityError`];
//! [`FrameworkError::downcast_entity`] turns them back into the entity's own error
//! type so callers can match on it.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers requests from scripted expectations. See the
//! [`mock`] module for the supported testing patterns.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
