//! Address to coordinates lookup.
//!
//! [`HttpGeocoder`] talks to a Google-style geocoding API:
//!
//! ```text
//! GET {endpoint}?address=Indiranagar%2C+Bengaluru%2C+India&key=...
//! {"status": "OK", "results": [{"geometry": {"location": {"lat": 12.97, "lng": 77.64}}}]}
//! ```
//!
//! `ZERO_RESULTS` is not an error, the address simply has no coordinates.

use crate::model::Coordinates;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoding service returned status {0}")]
    Status(u16),

    #[error("geocoding service error: {0}")]
    Provider(String),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Coordinates of `address`, or `None` when the service knows no match.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: Coordinates,
}

pub struct HttpGeocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpGeocoder {
    pub fn new(endpoint: String, api_key: String) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }
        let body: GeocodeResponse = response.json().await?;
        debug!(status = %body.status, results = body.results.len(), "Geocoding response");
        match body.status.as_str() {
            "OK" => Ok(body.results.into_iter().next().map(|r| r.geometry.location)),
            "ZERO_RESULTS" => Ok(None),
            other => Err(GeocodeError::Provider(
                body.error_message.unwrap_or_else(|| other.to_string()),
            )),
        }
    }
}

/// Fixed address book, for tests and local runs without an API key.
#[derive(Default)]
pub struct StaticGeocoder {
    known: HashMap<String, Coordinates>,
    lookups: Mutex<Vec<String>>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, coordinates: Coordinates) -> Self {
        self.known.insert(address.to_string(), coordinates);
        self
    }

    /// Addresses looked up so far, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(address.to_string());
        Ok(self.known.get(address).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_google_style_responses() {
        let ok: GeocodeResponse = serde_json::from_str(
            r#"{"status":"OK","results":[{"geometry":{"location":{"lat":12.5,"lng":77.25}},"place_id":"x"}]}"#,
        )
        .unwrap();
        assert_eq!(ok.results[0].geometry.location, Coordinates { lat: 12.5, lng: 77.25 });

        let none: GeocodeResponse = serde_json::from_str(r#"{"status":"ZERO_RESULTS"}"#).unwrap();
        assert!(none.results.is_empty());
    }

    #[tokio::test]
    async fn static_geocoder_records_lookups() {
        let geocoder = StaticGeocoder::new().with("Goa, India", Coordinates { lat: 15.3, lng: 74.1 });
        assert!(geocoder.geocode("Goa, India").await.unwrap().is_some());
        assert!(geocoder.geocode("Atlantis").await.unwrap().is_none());
        assert_eq!(geocoder.lookups(), vec!["Goa, India", "Atlantis"]);
    }
}
