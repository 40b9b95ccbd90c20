//! Routing server response body.
//!
//! Only the fields the translator reads are modelled; everything else in the
//! response is ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    #[serde(default)]
    pub paths: Vec<Path>,
}

/// One candidate route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Meters.
    pub distance: f64,
    /// Milliseconds.
    pub time: f64,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub text: String,
    /// Meters covered by this step.
    pub distance: f64,
}
