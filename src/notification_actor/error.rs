//! Error types for the notification and push token actors.

use canopy_actors::FrameworkError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(String),

    #[error("Invalid notification: {0}")]
    Invalid(String),

    /// The push token is registered already.
    #[error("Token already registered: {0}")]
    Conflict(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for NotificationError {
    fn from(e: FrameworkError) -> Self {
        match e.downcast_entity::<NotificationError>() {
            Ok(err) => err,
            Err(FrameworkError::NotFound(id)) => NotificationError::NotFound(id),
            Err(FrameworkError::Conflict(token)) => NotificationError::Conflict(token),
            Err(other) => NotificationError::ActorCommunicationError(other.to_string()),
        }
    }
}
