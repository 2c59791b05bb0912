//! ActorEntity implementation for [`User`].

use super::UserError;
use crate::model::{User, UserCreate, UserId, UserUpdate};
use async_trait::async_trait;
use canopy_actors::ActorEntity;
use chrono::Utc;
use std::convert::Infallible;

fn clean_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
}

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Context = ();
    type Error = UserError;

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, Self::Error> {
        let name = params.name.trim().to_string();
        if name.is_empty() {
            return Err(UserError::ValidationError("name is required".to_string()));
        }
        if params.phone.is_empty() {
            return Err(UserError::ValidationError("phone is required".to_string()));
        }
        Ok(Self {
            id,
            name,
            phone: params.phone,
            email: clean_email(params.email),
            phone_verified_at: None,
            is_active: true,
            created_at: Utc::now(),
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.phone.clone())
    }

    /// # Fields Updated
    /// - `name` (must stay non-blank), `email`, `is_active`
    /// - `phone_verified_at`: only the first verification is kept
    async fn on_update(&mut self, update: UserUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(UserError::ValidationError("name is required".to_string()));
            }
            self.name = name;
        }
        if update.email.is_some() {
            self.email = clean_email(update.email);
        }
        if let Some(verified_at) = update.phone_verified_at {
            self.phone_verified_at.get_or_insert(verified_at);
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), Self::Error> {
        match action {}
    }
}
