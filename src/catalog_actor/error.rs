//! Error types for the catalog actors (products, variants and attributes).

use canopy_actors::FrameworkError;
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// The requested product, variant or attribute was not found.
    #[error("Catalog entry not found: {0}")]
    NotFound(String),

    /// The submitted data is invalid.
    #[error("Invalid catalog data: {0}")]
    InvalidInput(String),

    /// The requested quantity exceeds the available stock.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// The provided quantity is invalid (e.g., zero).
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// A slug or variant combination is already taken.
    #[error("Already exists: {0}")]
    Conflict(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for CatalogError {
    fn from(e: FrameworkError) -> Self {
        match e.downcast_entity::<CatalogError>() {
            Ok(err) => err,
            Err(FrameworkError::NotFound(id)) => CatalogError::NotFound(id),
            Err(FrameworkError::Conflict(key)) => CatalogError::Conflict(key),
            Err(other) => CatalogError::ActorCommunicationError(other.to_string()),
        }
    }
}
