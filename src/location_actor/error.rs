//! Error types for the Location actor.

use canopy_actors::FrameworkError;
use thiserror::Error;

/// Errors that can occur during location operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LocationError {
    /// The requested location was not found.
    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("Invalid location: {0}")]
    Invalid(String),

    /// The parent does not sit above the new location in the hierarchy.
    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    #[error("Location slug already exists: {0}")]
    Conflict(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for LocationError {
    fn from(e: FrameworkError) -> Self {
        match e.downcast_entity::<LocationError>() {
            Ok(err) => err,
            Err(FrameworkError::NotFound(id)) => LocationError::NotFound(id),
            Err(FrameworkError::Conflict(slug)) => LocationError::Conflict(slug),
            Err(other) => LocationError::ActorCommunicationError(other.to_string()),
        }
    }
}
