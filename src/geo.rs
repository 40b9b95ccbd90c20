//! Geographic coordinates used between stages.

use crate::error::{NavError, Result};
use crate::gnss::Fix;
use std::fmt;
use std::str::FromStr;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Fix> for Coordinate {
    fn from(fix: Fix) -> Self {
        Self::new(fix.latitude, fix.longitude)
    }
}

/// Renders as `lat,lng`, the form the routing API takes for `point`.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || NavError::ConfigInvalidValue {
            key: "coordinate".to_string(),
            message: format!("expected 'lat,lng', got '{s}'"),
        };

        let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lng.trim().parse().map_err(|_| invalid())?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid());
        }
        Ok(Self::new(latitude, longitude))
    }
}
