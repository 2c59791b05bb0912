//! Location tree management and geocoding.

use crate::clients::LocationClient;
use crate::geocoding::Geocoder;
use crate::jobs::{Job, JobQueue};
use crate::location_actor::LocationError;
use crate::model::{Location, LocationCreate, LocationId, LocationKind, ParentRef};
use canopy_actors::ActorClient;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Deepest parent chain followed when building an address.
const MAX_DEPTH: usize = 8;

#[derive(Clone)]
pub struct LocationService {
    locations: LocationClient,
    geocoder: Arc<dyn Geocoder>,
    jobs: JobQueue,
}

impl LocationService {
    pub fn new(locations: LocationClient, geocoder: Arc<dyn Geocoder>, jobs: JobQueue) -> Self {
        Self {
            locations,
            geocoder,
            jobs,
        }
    }

    /// Creates a location below `parent` and queues its geocoding.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        name: String,
        kind: LocationKind,
        parent: Option<LocationId>,
    ) -> Result<Location, LocationError> {
        let parent = match parent {
            Some(id) => match self.locations.require(id).await {
                Ok(found) => Some(ParentRef {
                    id: found.id,
                    kind: found.kind,
                }),
                Err(LocationError::NotFound(_)) => {
                    return Err(LocationError::InvalidParent(format!("{id} does not exist")))
                }
                Err(e) => return Err(e),
            },
            None => None,
        };
        let id = self
            .locations
            .create_location(LocationCreate {
                name,
                slug: None,
                kind,
                parent,
            })
            .await?;
        self.jobs.dispatch(Job::GeocodeLocation(id));
        self.locations.require(id).await
    }

    /// Renames a location. A changed name is geocoded again.
    #[instrument(skip(self))]
    pub async fn rename(&self, id: LocationId, name: String) -> Result<Location, LocationError> {
        let before = self.locations.require(id).await?;
        let location = self.locations.rename(id, name).await?;
        if location.name != before.name {
            self.jobs.dispatch(Job::GeocodeLocation(id));
        }
        Ok(location)
    }

    pub async fn list(&self) -> Result<Vec<Location>, LocationError> {
        self.locations.list().await
    }

    /// `"Indiranagar, Bengaluru, Karnataka, India"`: names from the location up
    /// through its parents.
    pub async fn address_of(&self, id: LocationId) -> Result<String, LocationError> {
        let mut names = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            if names.len() == MAX_DEPTH {
                warn!(location = %id, "Location chain too deep, address truncated");
                break;
            }
            let location = self.locations.require(current).await?;
            names.push(location.name);
            next = location.parent_id;
        }
        Ok(names.join(", "))
    }

    /// Looks the location's address up and stores the coordinates.
    ///
    /// Geocoder failures and unknown addresses are logged and yield `None`.
    #[instrument(skip(self))]
    pub async fn geocode(&self, id: LocationId) -> Result<Option<Location>, LocationError> {
        let address = self.address_of(id).await?;
        let coordinates = match self.geocoder.geocode(&address).await {
            Ok(Some(coordinates)) if coordinates.is_valid() => coordinates,
            Ok(Some(coordinates)) => {
                warn!(%address, ?coordinates, "Geocoder returned out-of-range coordinates");
                return Ok(None);
            }
            Ok(None) => {
                info!(%address, "No geocoding match");
                return Ok(None);
            }
            Err(e) => {
                warn!(%address, error = %e, "Geocoding failed");
                return Ok(None);
            }
        };
        let location = self
            .locations
            .set_coordinates(id, coordinates, Utc::now())
            .await?;
        info!(%address, lat = coordinates.lat, lng = coordinates.lng, "Location geocoded");
        Ok(Some(location))
    }
}
