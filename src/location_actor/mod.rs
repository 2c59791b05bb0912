//! # Location Actor
//!
//! The country > state > city > area tree. Coordinates are not part of the
//! create payload: the `GeocodeLocation` job fills them in after a location is
//! created or renamed.

pub mod entity;
pub mod error;

pub use entity::LocationAction;
pub use error::*;

use crate::clients::LocationClient;
use crate::model::Location;
use canopy_actors::ResourceActor;

/// Creates a new Location actor and its client.
pub fn new(buffer: usize) -> (ResourceActor<Location>, LocationClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, LocationClient::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, LocationCreate, LocationKind, ParentRef};
    use canopy_actors::ActorClient;
    use chrono::Utc;

    fn create(name: &str, kind: LocationKind, parent: Option<ParentRef>) -> LocationCreate {
        LocationCreate {
            name: name.to_string(),
            slug: None,
            kind,
            parent,
        }
    }

    #[tokio::test]
    async fn test_hierarchy_is_enforced() {
        let (actor, locations) = new(8);
        tokio::spawn(actor.run(()));

        let india = locations
            .create_location(create("India", LocationKind::Country, None))
            .await
            .unwrap();
        let parent = ParentRef { id: india, kind: LocationKind::Country };

        let nested = locations
            .create_location(create("Asia", LocationKind::Country, Some(parent)))
            .await;
        assert!(matches!(nested, Err(LocationError::InvalidParent(_))));

        let state = locations
            .create_location(create("Karnataka", LocationKind::State, Some(parent)))
            .await
            .unwrap();
        let upward = locations
            .create_location(create(
                "Somewhere",
                LocationKind::State,
                Some(ParentRef { id: state, kind: LocationKind::State }),
            ))
            .await;
        assert!(matches!(upward, Err(LocationError::InvalidParent(_))));

        assert_eq!(locations.children(india).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_clears_coordinates() {
        let (actor, locations) = new(8);
        tokio::spawn(actor.run(()));
        let id = locations
            .create_location(create("Bengaluru", LocationKind::City, None))
            .await
            .unwrap();

        let bad = locations
            .set_coordinates(id, Coordinates { lat: 120.0, lng: 0.0 }, Utc::now())
            .await;
        assert!(matches!(bad, Err(LocationError::Invalid(_))));

        let located = locations
            .set_coordinates(id, Coordinates { lat: 12.97, lng: 77.59 }, Utc::now())
            .await
            .unwrap();
        assert!(located.geocoded_at.is_some());

        let same = locations.rename(id, "Bengaluru ".to_string()).await.unwrap();
        assert!(same.coordinates.is_some());

        let renamed = locations.rename(id, "Bangalore".to_string()).await.unwrap();
        assert_eq!(renamed.coordinates, None);
        assert_eq!(renamed.geocoded_at, None);
        assert_eq!(renamed.slug, "bengaluru");
        assert_eq!(locations.get(id).await.unwrap().unwrap().name, "Bangalore");
    }
}
