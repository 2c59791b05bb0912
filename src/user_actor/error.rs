//! Error types for the User actor.

use canopy_actors::FrameworkError;
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    /// The requested user was not found.
    #[error("User not found: {0}")]
    NotFound(String),

    /// Another user already registered this phone number.
    #[error("Phone already registered: {0}")]
    PhoneTaken(String),

    /// The user data provided is invalid.
    #[error("User validation error: {0}")]
    ValidationError(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for UserError {
    fn from(e: FrameworkError) -> Self {
        match e.downcast_entity::<UserError>() {
            Ok(err) => err,
            Err(FrameworkError::NotFound(id)) => UserError::NotFound(id),
            Err(FrameworkError::Conflict(phone)) => UserError::PhoneTaken(phone),
            Err(other) => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}
