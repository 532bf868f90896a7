//! Parsing boundary for untyped route parameters.
//!
//! Pickup and drop-off arrive as loose strings keyed by the names the
//! navigation layer uses (`pickupLatitude`, `dropoffName`, ...). Nothing past
//! this module sees those strings: [`RouteParams::parse`] either yields a
//! typed [`RideRoute`] or fails on the first bad field.

use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, LATITUDE_RANGE, LONGITUDE_RANGE};
use crate::ride::{Place, RideRoute};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("missing route parameter '{field}'")]
    Missing { field: String },
    #[error("route parameter '{field}' is not a number: '{value}'")]
    NotANumber { field: String, value: String },
    #[error("route parameter '{field}' is out of range: {value}")]
    OutOfRange { field: String, value: String },
}

pub const PICKUP_LATITUDE: &str = "pickupLatitude";
pub const PICKUP_LONGITUDE: &str = "pickupLongitude";
pub const PICKUP_ADDRESS: &str = "pickupAddress";
pub const PICKUP_NAME: &str = "pickupName";
pub const DROPOFF_LATITUDE: &str = "dropoffLatitude";
pub const DROPOFF_LONGITUDE: &str = "dropoffLongitude";
pub const DROPOFF_ADDRESS: &str = "dropoffAddress";
pub const DROPOFF_NAME: &str = "dropoffName";

/// Raw route parameters as handed over by navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteParams {
    pub pickup_latitude: Option<String>,
    pub pickup_longitude: Option<String>,
    pub pickup_address: Option<String>,
    pub pickup_name: Option<String>,
    pub dropoff_latitude: Option<String>,
    pub dropoff_longitude: Option<String>,
    pub dropoff_address: Option<String>,
    pub dropoff_name: Option<String>,
}

impl RouteParams {
    /// Collect parameters from key/value pairs. Unknown keys are ignored and
    /// later duplicates win.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                PICKUP_LATITUDE => &mut params.pickup_latitude,
                PICKUP_LONGITUDE => &mut params.pickup_longitude,
                PICKUP_ADDRESS => &mut params.pickup_address,
                PICKUP_NAME => &mut params.pickup_name,
                DROPOFF_LATITUDE => &mut params.dropoff_latitude,
                DROPOFF_LONGITUDE => &mut params.dropoff_longitude,
                DROPOFF_ADDRESS => &mut params.dropoff_address,
                DROPOFF_NAME => &mut params.dropoff_name,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        params
    }

    /// Validate and convert into a typed route.
    pub fn parse(&self) -> Result<RideRoute, ParseError> {
        let pickup = Place {
            point: parse_point(
                (PICKUP_LATITUDE, self.pickup_latitude.as_deref()),
                (PICKUP_LONGITUDE, self.pickup_longitude.as_deref()),
            )?,
            address: non_blank(self.pickup_address.as_deref()),
            name: non_blank(self.pickup_name.as_deref()),
        };
        let dropoff = Place {
            point: parse_point(
                (DROPOFF_LATITUDE, self.dropoff_latitude.as_deref()),
                (DROPOFF_LONGITUDE, self.dropoff_longitude.as_deref()),
            )?,
            address: non_blank(self.dropoff_address.as_deref()),
            name: non_blank(self.dropoff_name.as_deref()),
        };
        Ok(RideRoute { pickup, dropoff })
    }
}

fn parse_point(
    (lat_field, lat_raw): (&str, Option<&str>),
    (lng_field, lng_raw): (&str, Option<&str>),
) -> Result<GeoPoint, ParseError> {
    let latitude = parse_degrees(lat_field, lat_raw, &LATITUDE_RANGE)?;
    let longitude = parse_degrees(lng_field, lng_raw, &LONGITUDE_RANGE)?;
    Ok(GeoPoint::new_unchecked(latitude, longitude))
}

/// Parse one coordinate in degrees and check it against `range`.
pub fn parse_degrees(
    field: &str,
    raw: Option<&str>,
    range: &std::ops::RangeInclusive<f64>,
) -> Result<f64, ParseError> {
    let value = raw.map(str::trim).filter(|value| !value.is_empty());
    let Some(value) = value else {
        return Err(ParseError::Missing {
            field: field.to_string(),
        });
    };

    let degrees = match value.parse::<f64>() {
        Ok(degrees) if degrees.is_finite() => degrees,
        _ => {
            return Err(ParseError::NotANumber {
                field: field.to_string(),
                value: value.to_string(),
            })
        }
    };

    if !range.contains(&degrees) {
        return Err(ParseError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(degrees)
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
