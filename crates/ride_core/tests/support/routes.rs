use ride_core::params::{
    DROPOFF_LATITUDE, DROPOFF_LONGITUDE, DROPOFF_NAME, PICKUP_LATITUDE, PICKUP_LONGITUDE,
    PICKUP_NAME,
};
use ride_core::{GeoPoint, RouteParams};

/// Saddar, Karachi.
pub fn karachi_pickup() -> GeoPoint {
    GeoPoint::new(24.8607, 67.0011).expect("valid point")
}

/// Gulshan-e-Iqbal, Karachi. ~9.58 km from [`karachi_pickup`].
pub fn karachi_dropoff() -> GeoPoint {
    GeoPoint::new(24.9056, 67.0822).expect("valid point")
}

/// Spread of points used for property-style checks.
pub fn sample_points() -> Vec<GeoPoint> {
    [
        (24.8607, 67.0011),
        (24.9056, 67.0822),
        (52.5200, 13.4050),
        (-33.8688, 151.2093),
        (0.0, 0.0),
        (89.9, -179.9),
        (-89.9, 179.9),
        (40.7128, -74.0060),
    ]
    .into_iter()
    .map(|(lat, lng)| GeoPoint::new(lat, lng).expect("valid point"))
    .collect()
}

/// Raw navigation parameters for the Karachi cross-town trip.
pub fn karachi_params() -> RouteParams {
    RouteParams::from_pairs([
        (PICKUP_LATITUDE, "24.8607"),
        (PICKUP_LONGITUDE, "67.0011"),
        (PICKUP_NAME, "Empress Market"),
        (DROPOFF_LATITUDE, "24.9056"),
        (DROPOFF_LONGITUDE, "67.0822"),
        (DROPOFF_NAME, "Gulshan-e-Iqbal"),
    ])
}
