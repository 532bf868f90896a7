//! Fare estimation and ride request plumbing for the rider app.
//!
//! The crate is split so the pure pieces never see a store:
//!
//! - **geo**: `GeoPoint` and haversine distance
//! - **tier** / **fare**: vehicle tiers, rate tables and the fare estimator
//! - **params**: validated parsing of untyped route parameters
//! - **ride** / **store**: ride documents and the injected store interface
//! - **booking**: quote, confirm and watch flow tying the pieces together
//! - **config**: JSON rate configuration

pub mod booking;
pub mod config;
pub mod fare;
pub mod geo;
pub mod params;
pub mod ride;
pub mod store;
pub mod tier;

pub use booking::{BookingError, RideBooking};
pub use fare::{estimate_fare, estimate_fare_for_id, FareError, FareEstimate, FareEstimator};
pub use geo::{distance_km, GeoPoint, EARTH_RADIUS_KM};
pub use params::{ParseError, RouteParams};
pub use ride::{Place, RideId, RideRequest, RideRoute, RideStatus, StatusChange};
pub use store::{InMemoryRideStore, RideStore, StatusCallback, StoreError, Subscription};
pub use tier::{RateTable, VehicleTier};
