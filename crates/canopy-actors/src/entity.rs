//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract every stored resource (users, products,
//! orders, coupons, locations, ...) implements to be managed by the generic
//! [`ResourceActor`](crate::ResourceActor).
//!
//! The lifecycle hooks are where record-level business rules live: slug and SKU
//! generation on create, clearing derived data on update, validation against other
//! resources through the injected `Context`.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//! - [`ActorEntity::unique_key`]
//! - [`ActorEntity::entity_name`]
//!
//! The defaults do nothing (`Ok(())` / `None`).

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// Hooks are async so they can call other actors. The `Context` type is injected
/// into every hook at `run()` time, so dependencies are bound late and actors can be
/// created in any order.
///
/// A hook must never call back into its *own* actor: the actor is busy running the
/// hook and would wait on itself forever.
#[async_trait]
pub trait ActorEntity: Clone + Debug + Send + Sync + 'static {
    /// The unique identifier for this entity.
    /// Must be convertible from u32 for automatic ID generation, and ordered so
    /// listings come back in creation order.
    type Id: Eq + Hash + Ord + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g., `ReserveStock`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One enum per actor rather than one per message: callers match on a single
    /// error type, at the cost of every operation sharing the union of failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Short name used in log fields.
    fn entity_name() -> &'static str {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("Unknown")
    }

    /// A key that must be unique across all stored entities of this type
    /// (a phone number, a coupon code, a push token).
    ///
    /// The actor rejects creates and updates that would produce a duplicate with
    /// [`FrameworkError::Conflict`](crate::FrameworkError::Conflict).
    fn unique_key(&self) -> Option<String> {
        None
    }

    // --- Lifecycle Hooks (Async) ---

    /// Called immediately after the entity is constructed, before it is stored.
    /// An error here means the entity is never stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    /// If this returns an error the stored entity is left as it was before the call.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the system.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
