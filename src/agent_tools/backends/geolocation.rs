//! Geolocation Backend
//!
//! Coordinate validation, geocoding, reverse geocoding, and route summaries
//! for the geolocation agent. The actual lookups sit behind two capability
//! traits:
//!
//! - [`PlaceIndex`]: free-text geocoding and coordinate-to-address reverse
//!   geocoding
//! - [`RouteCalculator`]: departure/destination routing producing a
//!   [`RouteSummary`]
//!
//! [`StaticPlaceIndex`] and [`HaversineRouteCalculator`] are self-contained
//! implementations used by tests and local wiring; production deployments
//! inject clients for whichever managed location service they use.
//!
//! # Example
//!
//! ```rust
//! use agent_tools::backends::geolocation::{format_duration, Coordinates};
//!
//! let seattle = Coordinates::new(47.6062, -122.3321).unwrap();
//! assert!(Coordinates::new(91.0, 0.0).is_err());
//! assert_eq!(format_duration(3725), "1 hours, 2 minutes, 5 seconds");
//! ```

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JsonValue;

use crate::agent_tools::endpoint::EndpointError;

/// Error type for place index and route calculator providers.
#[derive(Debug, Clone)]
pub struct GeoError {
    message: String,
}

impl GeoError {
    pub fn new(message: impl Into<String>) -> Self {
        GeoError {
            message: message.into(),
        }
    }
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Geolocation error: {}", self.message)
    }
}

impl Error for GeoError {}

impl From<GeoError> for EndpointError {
    fn from(error: GeoError) -> Self {
        EndpointError::Upstream(error.to_string())
    }
}

/// A validated latitude/longitude pair.
///
/// Construction rejects non-finite values, latitudes outside [-90, 90], and
/// longitudes outside [-180, 180], so every `Coordinates` in the system is
/// usable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::new("coordinates must be finite numbers"));
        }
        if latitude < -90.0 || latitude > 90.0 {
            return Err(GeoError::new(format!(
                "latitude {} is outside [-90, 90]",
                latitude
            )));
        }
        if longitude < -180.0 || longitude > 180.0 {
            return Err(GeoError::new(format!(
                "longitude {} is outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// A geocoding hit: a display label plus its coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub label: String,
    pub coordinates: Coordinates,
}

/// Travel mode for route calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TravelMode {
    Car,
    Truck,
    Walking,
}

impl TravelMode {
    /// Case-insensitive parse; unknown modes are rejected.
    pub fn parse(raw: &str) -> Result<Self, GeoError> {
        match raw.trim().to_lowercase().as_str() {
            "car" => Ok(TravelMode::Car),
            "truck" => Ok(TravelMode::Truck),
            "walking" => Ok(TravelMode::Walking),
            other => Err(GeoError::new(format!("unknown travel mode '{}'", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Car => "Car",
            TravelMode::Truck => "Truck",
            TravelMode::Walking => "Walking",
        }
    }

    /// Average speed used by the haversine calculator.
    fn average_speed_kmh(&self) -> f64 {
        match self {
            TravelMode::Car => 105.0,
            TravelMode::Truck => 90.0,
            TravelMode::Walking => 5.0,
        }
    }
}

/// Distance unit for route summaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DistanceUnit {
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn parse(raw: &str) -> Result<Self, GeoError> {
        match raw.trim().to_lowercase().as_str() {
            "miles" => Ok(DistanceUnit::Miles),
            "kilometers" => Ok(DistanceUnit::Kilometers),
            other => Err(GeoError::new(format!("unknown distance unit '{}'", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Miles => "Miles",
            DistanceUnit::Kilometers => "Kilometers",
        }
    }

    fn from_km(&self, km: f64) -> f64 {
        match self {
            DistanceUnit::Miles => km * 0.621_371,
            DistanceUnit::Kilometers => km,
        }
    }
}

/// Route between two positions, reduced to totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Which provider produced the route.
    pub data_source: String,
    /// Total distance in `distance_unit`.
    pub distance: f64,
    pub distance_unit: DistanceUnit,
    /// Total travel time in seconds.
    pub duration_seconds: u64,
}

impl RouteSummary {
    /// The JSON shape handed back to agents:
    /// `{DataSource, TotalDistance: {Value, Unit}, TotalDuration, Legs}`.
    pub fn summarize(&self) -> JsonValue {
        json!({
            "DataSource": self.data_source,
            "TotalDistance": {
                "Value": (self.distance * 100.0).round() / 100.0,
                "Unit": self.distance_unit.as_str(),
            },
            "TotalDuration": format_duration(self.duration_seconds),
            "Legs": [],
        })
    }
}

/// Render a duration as `"H hours, M minutes, S seconds"`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{} hours, {} minutes, {} seconds", hours, minutes, secs)
}

/// Assemble a US postal address from its query parameter parts.
pub fn format_postal_address(
    street_number: &str,
    street_name: &str,
    city: &str,
    state: &str,
    zip_code: &str,
) -> String {
    format!(
        "{} {}, {}, {} {}",
        street_number.trim(),
        street_name.trim(),
        city.trim(),
        state.trim(),
        zip_code.trim()
    )
}

/// Free-text geocoding and reverse geocoding.
#[async_trait]
pub trait PlaceIndex: Send + Sync {
    /// The best match for a location description, if any.
    async fn geocode(&self, text: &str) -> Result<Option<GeocodedPlace>, GeoError>;

    /// The address label closest to the given coordinates, if any.
    async fn reverse_geocode(&self, coordinates: Coordinates)
        -> Result<Option<String>, GeoError>;
}

/// Route calculation between two positions.
#[async_trait]
pub trait RouteCalculator: Send + Sync {
    /// A route summary, or `None` when no route exists between the positions.
    async fn route(
        &self,
        departure: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
        unit: DistanceUnit,
    ) -> Result<Option<RouteSummary>, GeoError>;
}

/// Great-circle distance in kilometers.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// In-memory place index used by tests and local wiring.
///
/// Geocoding matches case-insensitively in either direction (the query
/// containing the label or the label containing the query); reverse geocoding
/// returns the nearest entry within 50 km.
pub struct StaticPlaceIndex {
    places: Vec<GeocodedPlace>,
}

impl StaticPlaceIndex {
    pub fn new() -> Self {
        Self { places: Vec::new() }
    }

    /// Add a labelled coordinate; invalid coordinates are rejected.
    pub fn with_place(
        mut self,
        label: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, GeoError> {
        self.places.push(GeocodedPlace {
            label: label.into(),
            coordinates: Coordinates::new(latitude, longitude)?,
        });
        Ok(self)
    }
}

impl Default for StaticPlaceIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaceIndex for StaticPlaceIndex {
    async fn geocode(&self, text: &str) -> Result<Option<GeocodedPlace>, GeoError> {
        let query = text.trim().to_lowercase();
        if query.is_empty() {
            return Ok(None);
        }
        Ok(self
            .places
            .iter()
            .find(|place| {
                let label = place.label.to_lowercase();
                label.contains(&query) || query.contains(&label)
            })
            .cloned())
    }

    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
    ) -> Result<Option<String>, GeoError> {
        const MAX_DISTANCE_KM: f64 = 50.0;
        let nearest = self
            .places
            .iter()
            .map(|place| (haversine_km(coordinates, place.coordinates), place))
            .filter(|(distance, _)| *distance <= MAX_DISTANCE_KM)
            .min_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Ok(nearest.map(|(_, place)| place.label.clone()))
    }
}

/// Route calculator estimating travel time from great-circle distance and a
/// per-mode average speed. A stand-in for a managed routing service that
/// still exercises the full summary shape.
pub struct HaversineRouteCalculator {
    data_source: String,
}

impl HaversineRouteCalculator {
    pub fn new() -> Self {
        Self {
            data_source: "Haversine".to_string(),
        }
    }

    pub fn with_data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = data_source.into();
        self
    }
}

impl Default for HaversineRouteCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RouteCalculator for HaversineRouteCalculator {
    async fn route(
        &self,
        departure: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
        unit: DistanceUnit,
    ) -> Result<Option<RouteSummary>, GeoError> {
        let km = haversine_km(departure, destination);
        let duration_seconds = (km / mode.average_speed_kmh() * 3600.0).round() as u64;
        Ok(Some(RouteSummary {
            data_source: self.data_source.clone(),
            distance: unit.from_km(km),
            distance_unit: unit,
            duration_seconds,
        }))
    }
}
