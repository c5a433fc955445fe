//! Geo origin and radius resolution.
//!
//! Distances are expressed in miles throughout; the engine receives them
//! as strings such as `"5mi"`.

use elasto_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Radius applied by `near` when none is given.
pub const DEFAULT_RADIUS_MILES: f64 = 100.0;

/// Unit suffix understood by the engine.
pub const DISTANCE_UNIT: &str = "mi";

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, -90..=90.
    pub lat: f64,
    /// Longitude in degrees, -180..=180.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::validation_field(
                "lat",
                format!("latitude must be between -90 and 90, got {lat}"),
            ));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(Error::validation_field(
                "lon",
                format!("longitude must be between -180 and 180, got {lon}"),
            ));
        }
        Ok(Self { lat, lon })
    }

    /// `{"lat": .., "lon": ..}` as the engine expects it.
    pub fn to_json(&self) -> Value {
        json!({ "lat": self.lat, "lon": self.lon })
    }
}

/// Input to `near`: an origin plus an optional radius.
///
/// Coordinates are optional so that loosely-typed input (e.g. a JSON object
/// from a request) can be carried as-is and rejected at resolution time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Near {
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lon: Option<f64>,
    /// Radius in miles.
    pub radius: Option<f64>,
}

impl Near {
    /// Origin without an explicit radius.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            radius: None,
        }
    }

    /// Set the radius in miles.
    pub fn radius(mut self, miles: f64) -> Self {
        self.radius = Some(miles);
        self
    }

    /// Read `{lat, lon, radius}` from a JSON object.
    ///
    /// Members that are missing or not numbers are treated as absent.
    pub fn from_json(value: &Value) -> Self {
        let number = |key: &str| value.get(key).and_then(Value::as_f64);
        Self {
            lat: number("lat"),
            lon: number("lon"),
            radius: number("radius"),
        }
    }

    /// Resolve to a validated origin and an effective radius.
    ///
    /// A missing, zero, negative or non-finite radius falls back to
    /// `default_radius`.
    pub fn resolve(&self, default_radius: f64) -> Result<(GeoPoint, f64)> {
        let lat = self
            .lat
            .ok_or_else(|| Error::validation_field("lat", "near() requires a numeric latitude"))?;
        let lon = self
            .lon
            .ok_or_else(|| Error::validation_field("lon", "near() requires a numeric longitude"))?;
        let origin = GeoPoint::new(lat, lon)?;
        let radius = match self.radius {
            Some(r) if r.is_finite() && r > 0.0 => r,
            _ => default_radius,
        };
        Ok((origin, radius))
    }
}

/// Render a distance in miles, e.g. `5mi` or `2.5mi`.
pub fn format_miles(miles: f64) -> String {
    format!("{miles}{DISTANCE_UNIT}")
}

// ============================================================================
// Tests
// ============================================================================
