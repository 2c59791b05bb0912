//! # User Actor
//!
//! Owns registered users. No dependencies (`Context = ()`), no custom actions.
//! The phone number is unique; a second registration with the same phone is
//! rejected by the actor with a conflict that surfaces as
//! [`UserError::PhoneTaken`].

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::UserClient;
use crate::model::User;
use canopy_actors::ResourceActor;

/// Creates a new User actor and its client.
pub fn new(buffer: usize) -> (ResourceActor<User>, UserClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, UserClient::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{UserCreate, UserUpdate};
    use canopy_actors::ActorClient;
    use chrono::Utc;

    fn alice() -> UserCreate {
        UserCreate {
            name: " Alice ".to_string(),
            phone: "+4915112345678".to_string(),
            email: Some(" Alice@Example.com ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_and_rejects_duplicate_phone() {
        let (actor, client) = new(8);
        tokio::spawn(actor.run(()));

        let id = client.create_user(alice()).await.unwrap();
        let user = client.get(id).await.unwrap().unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert!(user.is_active);
        assert!(!user.is_verified());

        let dup = client.create_user(alice()).await;
        assert_eq!(dup, Err(UserError::PhoneTaken("+4915112345678".to_string())));

        let found = client.find_by_phone("+4915112345678").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(id));
    }

    #[tokio::test]
    async fn test_first_verification_is_kept() {
        let (actor, client) = new(8);
        tokio::spawn(actor.run(()));
        let id = client.create_user(alice()).await.unwrap();

        let first = Utc::now();
        client
            .update_user(
                id,
                UserUpdate {
                    phone_verified_at: Some(first),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let user = client
            .update_user(
                id,
                UserUpdate {
                    phone_verified_at: Some(first + chrono::Duration::days(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.phone_verified_at, Some(first));

        let blank = client
            .update_user(
                id,
                UserUpdate {
                    name: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(blank, Err(UserError::ValidationError(_))));
    }
}
