//! Error types for the sponsorship actors.

use canopy_actors::FrameworkError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur around campaigns, trees, plans and adoptions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SponsorshipError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    Invalid(String),

    /// Donations are only accepted while a campaign is active.
    #[error("Campaign {0} is not accepting donations")]
    CampaignNotActive(String),

    #[error("Campaign {0} has ended")]
    CampaignEnded(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Tree {0} is already adopted")]
    AlreadyAdopted(String),

    #[error("Tree {0} is not adopted")]
    NotAdopted(String),

    #[error("Plan {plan} has no price for {months} months")]
    NoPriceForDuration { plan: String, months: u32 },

    /// A slug or code is already taken.
    #[error("Already exists: {0}")]
    Conflict(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for SponsorshipError {
    fn from(e: FrameworkError) -> Self {
        match e.downcast_entity::<SponsorshipError>() {
            Ok(err) => err,
            Err(FrameworkError::NotFound(id)) => SponsorshipError::NotFound(id),
            Err(FrameworkError::Conflict(key)) => SponsorshipError::Conflict(key),
            Err(other) => SponsorshipError::ActorCommunicationError(other.to_string()),
        }
    }
}
