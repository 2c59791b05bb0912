//! ActorEntity implementation for [`Location`].

use super::LocationError;
use crate::codes::slugify;
use crate::model::{
    Coordinates, Location, LocationCreate, LocationId, LocationKind, LocationUpdate,
};
use async_trait::async_trait;
use canopy_actors::ActorEntity;
use chrono::{DateTime, Utc};

/// Custom actions for the Location actor.
#[derive(Debug, Clone)]
pub enum LocationAction {
    /// Stores geocoded coordinates. Returns the updated location.
    SetCoordinates {
        coordinates: Coordinates,
        at: DateTime<Utc>,
    },
}

#[async_trait]
impl ActorEntity for Location {
    type Id = LocationId;
    type Create = LocationCreate;
    type Update = LocationUpdate;
    type Action = LocationAction;
    type ActionResult = Location;
    type Context = ();
    type Error = LocationError;

    /// A country has no parent. Any other location may hang below a location of
    /// a strictly higher level.
    fn from_create_params(id: LocationId, params: LocationCreate) -> Result<Self, Self::Error> {
        let name = params.name.trim().to_string();
        if name.is_empty() {
            return Err(LocationError::Invalid("name is required".to_string()));
        }
        match (params.kind, params.parent) {
            (LocationKind::Country, Some(_)) => {
                return Err(LocationError::InvalidParent(
                    "a country cannot have a parent".to_string(),
                ));
            }
            (kind, Some(parent)) if parent.kind >= kind => {
                return Err(LocationError::InvalidParent(format!(
                    "a {kind:?} cannot be placed inside a {:?}",
                    parent.kind
                )));
            }
            _ => {}
        }
        Ok(Self {
            id,
            slug: params.slug.unwrap_or_else(|| slugify(&name)),
            name,
            kind: params.kind,
            parent_id: params.parent.map(|p| p.id),
            coordinates: None,
            geocoded_at: None,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.slug.clone())
    }

    /// A new name invalidates the coordinates; they are fetched again.
    async fn on_update(&mut self, update: LocationUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(LocationError::Invalid("name is required".to_string()));
            }
            if name != self.name {
                self.name = name;
                self.coordinates = None;
                self.geocoded_at = None;
            }
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: LocationAction,
        _ctx: &(),
    ) -> Result<Location, Self::Error> {
        match action {
            LocationAction::SetCoordinates { coordinates, at } => {
                if !coordinates.is_valid() {
                    return Err(LocationError::Invalid(format!(
                        "coordinates out of range: {}, {}",
                        coordinates.lat, coordinates.lng
                    )));
                }
                self.coordinates = Some(coordinates);
                self.geocoded_at = Some(at);
            }
        }
        Ok(self.clone())
    }
}
