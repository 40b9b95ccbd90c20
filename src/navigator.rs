//! Stages after fix acquisition: listen, resolve, route, speak.
//!
//! Each stage reports "nothing" rather than failing; the navigator turns
//! every early exit into a spoken notice and a [`NavOutcome`].

use crate::config::{PromptsConfig, RoutingConfig};
use crate::geo::Coordinate;
use crate::geocode::Geocoder;
use crate::routing::{BackendProbe, RouteService, translate};
use crate::speech::Announcer;
use crate::stt::Listener;
use std::sync::Arc;

/// How a navigation run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum NavOutcome {
    /// The route was spoken.
    Completed { steps: usize },
    /// Nothing recognizable was said.
    NoDestination,
    /// The destination could not be geocoded.
    Unresolved { destination: String },
    /// The routing backend is not running.
    BackendMissing,
    /// The routing server returned no usable route.
    NoRoute,
}

pub struct Navigator {
    listener: Arc<dyn Listener>,
    geocoder: Arc<dyn Geocoder>,
    backend: Arc<dyn BackendProbe>,
    router: Arc<dyn RouteService>,
    announcer: Arc<dyn Announcer>,
    routing: RoutingConfig,
    prompts: PromptsConfig,
}

impl Navigator {
    pub fn new(
        listener: Arc<dyn Listener>,
        geocoder: Arc<dyn Geocoder>,
        backend: Arc<dyn BackendProbe>,
        router: Arc<dyn RouteService>,
        announcer: Arc<dyn Announcer>,
    ) -> Self {
        Self {
            listener,
            geocoder,
            backend,
            router,
            announcer,
            routing: RoutingConfig::default(),
            prompts: PromptsConfig::default(),
        }
    }

    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptsConfig) -> Self {
        self.prompts = prompts;
        self
    }

    /// Run the remaining stages from `origin`.
    pub async fn navigate(&self, origin: impl Into<Coordinate>) -> NavOutcome {
        let origin = origin.into();

        self.say(&self.prompts.ask_destination).await;
        let Some(destination) = self.listener.listen().await else {
            self.say(&self.prompts.not_heard).await;
            return NavOutcome::NoDestination;
        };
        tracing::info!(%destination, "destination heard");

        let Some(target) = self.geocoder.geocode(&destination).await else {
            self.say(&self.prompts.unresolved).await;
            return NavOutcome::Unresolved { destination };
        };

        if !self.backend_running().await {
            self.say(&self.prompts.backend_missing).await;
            return NavOutcome::BackendMissing;
        }

        let response = self.router.route(origin, target).await;
        let Some(route) = translate(response.as_ref(), &self.routing) else {
            self.say(&self.prompts.no_route).await;
            return NavOutcome::NoRoute;
        };

        tracing::info!(
            distance_km = route.distance_km,
            minutes = route.minutes,
            steps = route.steps.len(),
            "route ready"
        );
        for line in route.lines() {
            self.say(line).await;
        }
        NavOutcome::Completed {
            steps: route.steps.len(),
        }
    }

    async fn backend_running(&self) -> bool {
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || backend.is_running())
            .await
            .unwrap_or(false)
    }

    async fn say(&self, text: &str) {
        if !text.is_empty() {
            self.announcer.announce(text).await;
        }
    }
}
