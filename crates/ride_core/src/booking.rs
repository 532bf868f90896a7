//! Quote, confirm and watch flow for one route.
//!
//! A rider picks a tier and gets a quote; confirming the quote persists a
//! `pending` ride through the injected store; watching the ride hands back a
//! [`Subscription`] the caller must keep alive for as long as it wants updates.

use std::sync::Arc;

use tracing::info;

use crate::fare::{FareError, FareEstimate, FareEstimator};
use crate::params::{ParseError, RouteParams};
use crate::ride::{RideId, RideRequest, RideRoute};
use crate::store::{RideStore, StatusCallback, StoreError, Subscription};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Fare(#[from] FareError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("cannot follow ride status: {0}")]
    Watch(StoreError),
    #[error("no fare quote to confirm")]
    NoQuote,
}

impl BookingError {
    /// Text to show the rider for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Parse(_) => "Pickup or drop-off location is invalid. Please choose again.",
            Self::Fare(FareError::UnknownTier(_)) => {
                "This vehicle type is not available. Please pick another."
            }
            Self::Fare(FareError::InvalidFare { .. }) => {
                "Unable to calculate fare. Please check inputs."
            }
            Self::Store(_) => "There was an issue adding the data. Please try again.",
            Self::Watch(_) => "Unable to follow this ride's status. Please try again.",
            Self::NoQuote => "Fare or vehicle type is missing.",
        }
    }
}

/// Booking session for one pickup/drop-off pair.
pub struct RideBooking<S: RideStore> {
    estimator: FareEstimator,
    route: RideRoute,
    store: Arc<S>,
    quote: Option<FareEstimate>,
}

impl<S: RideStore> RideBooking<S> {
    pub fn new(estimator: FareEstimator, route: RideRoute, store: Arc<S>) -> Self {
        Self {
            estimator,
            route,
            store,
            quote: None,
        }
    }

    /// Parse raw navigation parameters and start a session.
    pub fn from_params(
        estimator: FareEstimator,
        params: &RouteParams,
        store: Arc<S>,
    ) -> Result<Self, BookingError> {
        Ok(Self::new(estimator, params.parse()?, store))
    }

    pub fn route(&self) -> &RideRoute {
        &self.route
    }

    /// The quote `confirm` would submit.
    pub fn current_quote(&self) -> Option<&FareEstimate> {
        self.quote.as_ref()
    }

    /// Price the route for `tier_id` and remember the result.
    ///
    /// A failed quote leaves any earlier quote in place.
    pub fn quote(&mut self, tier_id: &str) -> Result<FareEstimate, BookingError> {
        let (pickup, dropoff) = (self.route.pickup.point, self.route.dropoff.point);
        let estimate = self.estimator.estimate_id(tier_id, pickup, dropoff)?;
        self.quote = Some(estimate.clone());
        Ok(estimate)
    }

    /// Persist the current quote as a pending ride.
    pub fn confirm(&mut self) -> Result<RideId, BookingError> {
        let quote = self.quote.as_ref().ok_or(BookingError::NoQuote)?;
        let ride = RideRequest::pending(&self.route, quote);
        let id = self.store.create_ride(ride)?;
        info!(ride_id = %id, vehicle = %quote.tier, fare = quote.fare, "ride request submitted");
        self.quote = None;
        Ok(id)
    }

    /// Drop the current quote without submitting it.
    pub fn cancel_quote(&mut self) -> Option<FareEstimate> {
        self.quote.take()
    }

    pub fn watch(
        &self,
        id: &RideId,
        callback: StatusCallback,
    ) -> Result<Subscription, BookingError> {
        self.store
            .on_status_change(id, callback)
            .map_err(BookingError::Watch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{DROPOFF_LATITUDE, DROPOFF_LONGITUDE, PICKUP_LATITUDE, PICKUP_LONGITUDE};
    use crate::ride::RideStatus;
    use crate::store::InMemoryRideStore;
    use crate::tier::VehicleTier;

    fn booking() -> RideBooking<InMemoryRideStore> {
        let params = RouteParams::from_pairs([
            (PICKUP_LATITUDE, "24.8607"),
            (PICKUP_LONGITUDE, "67.0011"),
            (DROPOFF_LATITUDE, "24.9056"),
            (DROPOFF_LONGITUDE, "67.0822"),
        ]);
        RideBooking::from_params(
            FareEstimator::standard(),
            &params,
            Arc::new(InMemoryRideStore::with_seed(11)),
        )
        .expect("valid params")
    }

    #[test]
    fn confirm_without_quote_fails() {
        let mut booking = booking();
        assert_eq!(booking.confirm(), Err(BookingError::NoQuote));
        assert_eq!(
            BookingError::NoQuote.user_message(),
            "Fare or vehicle type is missing."
        );
    }

    #[test]
    fn confirm_persists_quoted_fare_as_pending() {
        let mut booking = booking();
        let quote = booking.quote("rickshaw").expect("quote");
        let id = booking.confirm().expect("confirm");

        let stored = booking
            .store
            .get_ride(&id)
            .expect("query")
            .expect("ride exists");
        assert_eq!(stored.fare, quote.fare);
        assert_eq!(stored.vehicle, VehicleTier::Rickshaw);
        assert_eq!(stored.status, RideStatus::Pending);
        assert!(booking.current_quote().is_none());
    }

    #[test]
    fn failed_quote_keeps_previous_one() {
        let mut booking = booking();
        booking.quote("mini").expect("quote");
        let error = booking.quote("helicopter").expect_err("unknown tier");
        assert_eq!(
            error.user_message(),
            "This vehicle type is not available. Please pick another."
        );
        assert_eq!(
            booking.current_quote().map(|quote| quote.tier),
            Some(VehicleTier::Mini)
        );
    }

    #[test]
    fn watch_failure_is_not_reported_as_a_write() {
        let booking = booking();
        let error = booking
            .watch(&RideId::new("missing"), Box::new(|_: &crate::ride::StatusChange| {}))
            .expect_err("unknown ride");
        assert_eq!(
            error,
            BookingError::Watch(StoreError::NotFound(RideId::new("missing")))
        );
        assert_eq!(
            error.user_message(),
            "Unable to follow this ride's status. Please try again."
        );
    }

    #[test]
    fn bad_params_fail_before_any_quote() {
        let params = RouteParams::from_pairs([(PICKUP_LATITUDE, "24.8607")]);
        let result = RideBooking::from_params(
            FareEstimator::standard(),
            &params,
            Arc::new(InMemoryRideStore::with_seed(12)),
        );
        assert!(matches!(result, Err(BookingError::Parse(_))));
    }
}
