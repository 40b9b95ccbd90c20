//! Address resolution against a Nominatim-compatible search API.

use crate::config::GeocoderConfig;
use crate::error::{NavError, Result};
use crate::geo::Coordinate;
use crate::http;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns a free-text address into a coordinate.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// `None` when the address cannot be resolved or the service is
    /// unavailable. Never fails.
    async fn geocode(&self, address: &str) -> Option<Coordinate>;
}

pub struct NominatimGeocoder {
    client: reqwest::Client,
    url: String,
    country_suffix: String,
}

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(&config.user_agent, REQUEST_TIMEOUT)?,
            url: config.url.trim_end_matches('/').to_string(),
            country_suffix: config.country_suffix.clone(),
        })
    }

    /// The query actually sent: the address with the country qualifier.
    pub fn qualified(&self, address: &str) -> String {
        format!("{}{}", address.trim(), self.country_suffix)
    }

    /// Search for `address`, surfacing transport and format errors.
    pub async fn search(&self, address: &str) -> Result<Option<Coordinate>> {
        let query = self.qualified(address);
        tracing::debug!(%query, "geocoding");

        let response = self
            .client
            .get(format!("{}/search", self.url))
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| NavError::Geocoding {
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(NavError::Geocoding {
                message: format!("service returned status {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| NavError::Geocoding {
            message: format!("failed to read response: {e}"),
        })?;
        let places: Vec<Place> = serde_json::from_str(&body).map_err(|e| NavError::Geocoding {
            message: format!("unexpected response: {e}"),
        })?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };
        let latitude = place.lat.parse::<f64>();
        let longitude = place.lon.parse::<f64>();
        match (latitude, longitude) {
            (Ok(latitude), Ok(longitude)) => {
                tracing::debug!(place = %place.display_name, "geocoded");
                Ok(Some(Coordinate::new(latitude, longitude)))
            }
            _ => Err(NavError::Geocoding {
                message: format!("unparseable coordinate {},{}", place.lat, place.lon),
            }),
        }
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Option<Coordinate> {
        match self.search(address).await {
            Ok(Some(coordinate)) => {
                tracing::info!(address, %coordinate, "address resolved");
                Some(coordinate)
            }
            Ok(None) => {
                tracing::info!(address, "address not found");
                None
            }
            Err(e) => {
                tracing::warn!("{e}");
                None
            }
        }
    }
}

/// Geocoder answering from a fixed table.
#[derive(Debug, Clone, Default)]
pub struct MockGeocoder {
    places: HashMap<String, Coordinate>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, address: &str, coordinate: Coordinate) -> Self {
        self.places.insert(address.to_string(), coordinate);
        self
    }
}

#[async_trait::async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, address: &str) -> Option<Coordinate> {
        self.places.get(address).copied()
    }
}
