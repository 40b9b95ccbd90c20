//! Route request, translation and routing-backend presence check.

pub mod backend;
pub mod client;
pub mod translate;
pub mod types;

pub use backend::{BackendProbe, ContainerProbe};
pub use client::{GraphHopperClient, MockRouteService, RouteService};
pub use translate::{RouteSummary, translate};
pub use types::{Instruction, Path, RouteResponse};
