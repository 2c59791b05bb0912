//! # Framework Errors
//!
//! Common error types used by every actor and client.

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0} already exists")]
    Conflict(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Recovers the entity's own error type when this wraps one.
    ///
    /// Hook failures travel through the actor boxed as [`FrameworkError::EntityError`];
    /// clients use this to hand the caller back the concrete error it can match on.
    /// Any other error (or a boxed error of a different type) is returned unchanged
    /// in `Err`.
    pub fn downcast_entity<E>(self) -> Result<E, FrameworkError>
    where
        E: std::error::Error + 'static,
    {
        match self {
            FrameworkError::EntityError(err) => err
                .downcast::<E>()
                .map(|e| *e)
                .map_err(FrameworkError::EntityError),
            other => Err(other),
        }
    }
}
