//! Routing server client.

use crate::config::RoutingConfig;
use crate::defaults;
use crate::error::{NavError, Result};
use crate::geo::Coordinate;
use crate::http;
use crate::routing::types::RouteResponse;
use std::time::Duration;

/// Requests a route between two coordinates.
#[async_trait::async_trait]
pub trait RouteService: Send + Sync {
    /// The parsed response, or `None` on any non-2xx status, network failure
    /// or undecodable body.
    async fn route(&self, from: Coordinate, to: Coordinate) -> Option<RouteResponse>;
}

/// Client for a GraphHopper-compatible `/route` endpoint.
pub struct GraphHopperClient {
    client: reqwest::Client,
    url: String,
    profile: String,
    locale: String,
    api_key: String,
}

impl GraphHopperClient {
    pub fn new(config: &RoutingConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(defaults::USER_AGENT, Duration::from_secs(config.timeout_secs))?,
            url: config.url.trim_end_matches('/').to_string(),
            profile: config.profile.clone(),
            locale: config.locale.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Request a route, surfacing transport and format errors.
    pub async fn request(&self, from: Coordinate, to: Coordinate) -> Result<RouteResponse> {
        let from = from.to_string();
        let to = to.to_string();
        let query = [
            ("point", from.as_str()),
            ("point", to.as_str()),
            ("profile", self.profile.as_str()),
            ("locale", self.locale.as_str()),
            ("points_encoded", "false"),
            ("instructions", "true"),
            ("key", self.api_key.as_str()),
        ];

        tracing::debug!(%from, %to, profile = %self.profile, "requesting route");
        let response = self
            .client
            .get(format!("{}/route", self.url))
            .query(&query)
            .send()
            .await
            .map_err(|e| NavError::Routing {
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| NavError::Routing {
            message: format!("failed to read response: {e}"),
        })?;
        if !status.is_success() {
            return Err(NavError::Routing {
                message: format!("server returned status {status}: {}", body.trim()),
            });
        }

        serde_json::from_str(&body).map_err(|e| NavError::Routing {
            message: format!("unexpected response: {e}"),
        })
    }
}

#[async_trait::async_trait]
impl RouteService for GraphHopperClient {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Option<RouteResponse> {
        match self.request(from, to).await {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!("{e}");
                None
            }
        }
    }
}

/// Route service returning a canned response.
#[derive(Debug, Clone, Default)]
pub struct MockRouteService {
    response: Option<RouteResponse>,
}

impl MockRouteService {
    /// A service that is always unavailable.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, response: RouteResponse) -> Self {
        self.response = Some(response);
        self
    }
}

#[async_trait::async_trait]
impl RouteService for MockRouteService {
    async fn route(&self, _from: Coordinate, _to: Coordinate) -> Option<RouteResponse> {
        self.response.clone()
    }
}
