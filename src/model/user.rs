use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered customer, identified by phone number.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](canopy_actors::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](canopy_actors::ResourceActor).
/// The phone number is the entity's unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub phone_verified_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_verified(&self) -> bool {
        self.phone_verified_at.is_some()
    }
}

/// Payload for creating a new user. The phone must already be normalized.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_verified_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}
