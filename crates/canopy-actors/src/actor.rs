//! # Generic Actor Server
//!
//! `ResourceActor` owns the store for one resource type and processes requests
//! sequentially, so the store needs no locking.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// This is the "server" half: it owns the store and the receiving end of the
/// channel. Each actor runs in its own Tokio task and handles one message at a time;
/// different actors run in parallel.
///
/// # Usage Pattern
///
/// 1.  **Create**: `ResourceActor::new()` returns the actor and its client.
/// 2.  **Wire**: pass dependencies (other clients) into `actor.run(context)`.
/// 3.  **Run**: spawn the run loop in a background task.
///
/// ```rust
/// use canopy_actors::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Sapling { id: u32 }
/// #[derive(Debug)] struct SaplingCreate;
/// #[derive(Debug)] struct SaplingUpdate;
/// #[derive(Debug)] enum SaplingAction {}
/// #[derive(Debug, thiserror::Error)] #[error("sapling error")] struct SaplingError;
///
/// #[async_trait]
/// impl ActorEntity for Sapling {
///     type Id = u32;
///     type Create = SaplingCreate;
///     type Update = SaplingUpdate;
///     type Action = SaplingAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = SaplingError;
///
///     fn from_create_params(id: u32, _: SaplingCreate) -> Result<Self, Self::Error> { Ok(Self { id }) }
///     async fn on_update(&mut self, _: SaplingUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: SaplingAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Sapling>::new(10);
///     tokio::spawn(actor.run(()));
///     let id = client.create(SaplingCreate).await.unwrap();
///     assert_eq!(id, 1);
/// }
/// ```
///
/// # Operations
///
/// * **Create**: next id, `from_create_params`, uniqueness check, `on_create`, insert.
/// * **Get**: clone of the stored entity, or `None`.
/// * **List**: clones of every stored entity, ascending by id.
/// * **Update**: `on_update` on the stored entity; on error (or a uniqueness
///   conflict) the previous state is restored.
/// * **Delete**: `on_delete`, then removal.
/// * **Action**: `handle_action` on the stored entity.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<T::Id, T>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the channel capacity; when it is full, client calls wait.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            next_id: 1,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    fn conflicting_key(&self, candidate: &T, own_id: Option<&T::Id>) -> Option<String> {
        let key = candidate.unique_key()?;
        self.store
            .iter()
            .filter(|(id, _)| Some(*id) != own_id)
            .any(|(_, existing)| existing.unique_key().as_deref() == Some(key.as_str()))
            .then_some(key)
    }

    /// Runs the actor's event loop until every client has been dropped.
    ///
    /// The `context` is handed to every entity hook.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = T::entity_name();
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let _ = respond_to.send(self.create(params, &context).await);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, size = self.store.len(), "List");
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let _ = respond_to.send(self.update(id, update, &context).await);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let _ = respond_to.send(self.delete(id, &context).await);
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let _ = respond_to.send(self.act(id, action, &context).await);
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    async fn create(&mut self, params: T::Create, context: &T::Context) -> Result<T::Id, FrameworkError> {
        let entity_type = T::entity_name();
        // Ids are consumed even when creation fails.
        let id = T::Id::from(self.next_id);
        self.next_id += 1;

        let mut item = T::from_create_params(id.clone(), params).map_err(|e| {
            warn!(entity_type, error = %e, "Create failed");
            FrameworkError::EntityError(Box::new(e))
        })?;
        if let Some(key) = self.conflicting_key(&item, None) {
            warn!(entity_type, %key, "Create conflict");
            return Err(FrameworkError::Conflict(key));
        }
        item.on_create(context).await.map_err(|e| {
            warn!(entity_type, error = %e, "on_create failed");
            FrameworkError::EntityError(Box::new(e))
        })?;

        self.store.insert(id.clone(), item);
        info!(entity_type, %id, size = self.store.len(), "Created");
        Ok(id)
    }

    async fn update(&mut self, id: T::Id, update: T::Update, context: &T::Context) -> Result<T, FrameworkError> {
        let entity_type = T::entity_name();
        let mut candidate = self.existing(&id)?.clone();
        candidate.on_update(update, context).await.map_err(|e| {
            warn!(entity_type, %id, error = %e, "Update failed");
            FrameworkError::EntityError(Box::new(e))
        })?;
        if let Some(key) = self.conflicting_key(&candidate, Some(&id)) {
            warn!(entity_type, %id, %key, "Update conflict");
            return Err(FrameworkError::Conflict(key));
        }

        self.store.insert(id.clone(), candidate.clone());
        info!(entity_type, %id, "Updated");
        Ok(candidate)
    }

    async fn delete(&mut self, id: T::Id, context: &T::Context) -> Result<(), FrameworkError> {
        let entity_type = T::entity_name();
        self.existing(&id)?.on_delete(context).await.map_err(|e| {
            warn!(entity_type, %id, error = %e, "on_delete failed");
            FrameworkError::EntityError(Box::new(e))
        })?;
        self.store.remove(&id);
        info!(entity_type, %id, size = self.store.len(), "Deleted");
        Ok(())
    }

    async fn act(
        &mut self,
        id: T::Id,
        action: T::Action,
        context: &T::Context,
    ) -> Result<T::ActionResult, FrameworkError> {
        let entity_type = T::entity_name();
        let Some(item) = self.store.get_mut(&id) else {
            warn!(entity_type, %id, "Not found");
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        match item.handle_action(action, context).await {
            Ok(result) => {
                info!(entity_type, %id, "Action ok");
                Ok(result)
            }
            Err(e) => {
                warn!(entity_type, %id, error = %e, "Action failed");
                Err(FrameworkError::EntityError(Box::new(e)))
            }
        }
    }

    fn existing(&self, id: &T::Id) -> Result<&T, FrameworkError> {
        self.store.get(id).ok_or_else(|| {
            warn!(entity_type = T::entity_name(), %id, "Not found");
            FrameworkError::NotFound(id.to_string())
        })
    }
}
