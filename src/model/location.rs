use super::LocationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Level in the location hierarchy. The declaration order is the hierarchy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Country,
    State,
    City,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A node of the location tree (country, state, city, area).
///
/// Coordinates are filled in asynchronously by the geocoding job after the
/// location is created or renamed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub slug: String,
    pub kind: LocationKind,
    pub parent_id: Option<LocationId>,
    pub coordinates: Option<Coordinates>,
    pub geocoded_at: Option<DateTime<Utc>>,
}

/// The already-resolved parent of a new location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentRef {
    pub id: LocationId,
    pub kind: LocationKind,
}

#[derive(Debug, Clone)]
pub struct LocationCreate {
    pub name: String,
    pub slug: Option<String>,
    pub kind: LocationKind,
    pub parent: Option<ParentRef>,
}

#[derive(Debug, Clone, Default)]
pub struct LocationUpdate {
    pub name: Option<String>,
}
