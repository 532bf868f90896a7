//! Geographic points and straight-line distance.
//!
//! Distances are great-circle (haversine) distances on a sphere of radius
//! [`EARTH_RADIUS_KM`]. They stand in for travel distance when pricing a ride.

use serde::{Deserialize, Serialize};

use crate::params::ParseError;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range degrees.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ParseError> {
        if !latitude.is_finite() || !LATITUDE_RANGE.contains(&latitude) {
            return Err(ParseError::OutOfRange {
                field: "latitude".to_string(),
                value: latitude.to_string(),
            });
        }
        if !longitude.is_finite() || !LONGITUDE_RANGE.contains(&longitude) {
            return Err(ParseError::OutOfRange {
                field: "longitude".to_string(),
                value: longitude.to_string(),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a point without range checks.
    ///
    /// [`distance_km`] still produces a number for such points, but it means
    /// nothing; the fare estimator rejects the non-finite results.
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Haversine distance in kilometres between two points.
///
/// Symmetric, and exactly `0.0` for identical points.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}
