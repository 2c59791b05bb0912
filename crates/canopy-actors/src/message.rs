//! # Generic Messages
//!
//! Message types exchanged between a `ResourceClient` and its `ResourceActor`.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Request sent to a resource actor.
///
/// The variants are the CRUD lifecycle of a stored resource plus `List` for admin
/// tables and `Action` for resource-specific operations that do not fit CRUD
/// (reserving stock, redeeming a coupon, adopting a tree).
///
/// The payload types come from the entity's associated types, so a `Product`
/// create payload cannot be sent to a `Coupon` actor.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}
