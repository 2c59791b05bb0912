use crate::codes::{slugify, unique_slug};
use crate::location_actor::{LocationAction, LocationError};
use crate::model::{Coordinates, Location, LocationCreate, LocationId, LocationUpdate};
use canopy_actors::ActorClient;
use chrono::{DateTime, Utc};
use tracing::instrument;

resource_client!(
    /// Client for interacting with the Location actor.
    LocationClient,
    Location,
    LocationError
);

impl LocationClient {
    #[instrument(skip(self, params), fields(name = %params.name, kind = ?params.kind))]
    pub async fn create_location(
        &self,
        mut params: LocationCreate,
    ) -> Result<LocationId, LocationError> {
        let base = params.slug.take().unwrap_or_else(|| slugify(&params.name));
        let existing = self.list().await?;
        params.slug = Some(unique_slug(&base, existing.iter().map(|l| l.slug.as_str())));
        self.inner.create(params).await.map_err(LocationError::from)
    }

    pub async fn require(&self, id: LocationId) -> Result<Location, LocationError> {
        self.get(id)
            .await?
            .ok_or_else(|| LocationError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn rename(&self, id: LocationId, name: String) -> Result<Location, LocationError> {
        let update = LocationUpdate { name: Some(name) };
        self.inner.update(id, update).await.map_err(LocationError::from)
    }

    #[instrument(skip(self))]
    pub async fn set_coordinates(
        &self,
        id: LocationId,
        coordinates: Coordinates,
        at: DateTime<Utc>,
    ) -> Result<Location, LocationError> {
        self.inner
            .perform_action(id, LocationAction::SetCoordinates { coordinates, at })
            .await
            .map_err(LocationError::from)
    }

    pub async fn children(&self, parent: LocationId) -> Result<Vec<Location>, LocationError> {
        let mut locations = self.list().await?;
        locations.retain(|l| l.parent_id == Some(parent));
        Ok(locations)
    }
}
