//! # ActorClient Trait
//!
//! Common interface for resource-specific clients: default `get`, `list` and
//! `delete` built on top of the generic `ResourceClient`.
use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit the standard read and delete
/// operations.
///
/// Creation, updates and actions stay on the concrete client, where their
/// payloads get typed, domain-named methods (`reserve_stock`, `redeem`, ...).
///
/// # Example
///
/// ```rust
/// use canopy_actors::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct Planter { id: u32 }
/// #[derive(Debug)] struct PlanterCreate;
/// #[derive(Debug)] struct PlanterUpdate;
/// #[derive(Debug)] enum PlanterAction {}
///
/// #[derive(Debug, thiserror::Error)]
/// enum PlanterError {
///     #[error("planter not found: {0}")]
///     NotFound(String),
///     #[error("actor communication error: {0}")]
///     ActorCommunicationError(String),
/// }
///
/// impl From<FrameworkError> for PlanterError {
///     fn from(e: FrameworkError) -> Self {
///         match e {
///             FrameworkError::NotFound(id) => PlanterError::NotFound(id),
///             other => PlanterError::ActorCommunicationError(other.to_string()),
///         }
///     }
/// }
///
/// #[async_trait]
/// impl ActorEntity for Planter {
///     type Id = u32;
///     type Create = PlanterCreate;
///     type Update = PlanterUpdate;
///     type Action = PlanterAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = PlanterError;
///
///     fn from_create_params(id: u32, _: PlanterCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id })
///     }
///     async fn on_update(&mut self, _: PlanterUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: PlanterAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// struct PlanterClient {
///     inner: ResourceClient<Planter>,
/// }
///
/// #[async_trait]
/// impl ActorClient<Planter> for PlanterClient {
///     type Error = PlanterError;
///
///     fn inner(&self) -> &ResourceClient<Planter> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         e.into()
///     }
/// }
///
/// async fn usage(client: PlanterClient) {
///     // get(), list() and delete() are provided
///     let _ = client.get(1).await;
///     let _ = client.list().await;
///     let _ = client.delete(1).await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: From<FrameworkError> + Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Fetch every entity, ascending by id.
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list().await.map_err(Self::map_error)
    }

    /// Delete an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
