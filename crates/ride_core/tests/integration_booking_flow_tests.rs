mod support;

use std::sync::{Arc, Mutex};

use ride_core::{
    BookingError, FareEstimator, InMemoryRideStore, RideBooking, RideStatus, RideStore,
    StatusChange, StoreError,
};
use support::routes::karachi_params;

fn new_booking(store: &Arc<InMemoryRideStore>) -> RideBooking<InMemoryRideStore> {
    RideBooking::from_params(FareEstimator::standard(), &karachi_params(), Arc::clone(store))
        .expect("valid params")
}

fn recorder() -> (Arc<Mutex<Vec<StatusChange>>>, ride_core::StatusCallback) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: ride_core::StatusCallback =
        Box::new(move |change: &StatusChange| sink.lock().expect("sink").push(change.clone()));
    (seen, callback)
}

#[test]
fn quoted_ride_is_persisted_and_acceptance_is_observed() {
    let store = Arc::new(InMemoryRideStore::with_seed(42));
    let mut booking = new_booking(&store);

    let quote = booking.quote("bike").expect("quote");
    assert_eq!(quote.summary(), "Your Est. fare will be 671");
    let ride_id = booking.confirm().expect("confirm");

    let stored = store.get_ride(&ride_id).expect("query").expect("ride exists");
    assert_eq!(stored.status, RideStatus::Pending);
    assert_eq!(stored.fare, 671);
    assert_eq!(stored.pickup.name.as_deref(), Some("Empress Market"));
    assert_eq!(stored.dropoff.name.as_deref(), Some("Gulshan-e-Iqbal"));

    let (seen, callback) = recorder();
    let subscription = booking.watch(&ride_id, callback).expect("watch");

    // Driver side accepts the pending ride.
    let pending = store
        .rides_with_status(RideStatus::Pending)
        .expect("query pending");
    assert_eq!(pending.len(), 1);
    store
        .update_status(&pending[0].0, RideStatus::Accepted)
        .expect("accept");

    let changes = seen.lock().expect("seen").clone();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].ride_id, ride_id);
    assert_eq!(changes[0].previous, RideStatus::Pending);
    assert_eq!(changes[0].current, RideStatus::Accepted);
    assert_eq!(changes[0].current.notice(), "Ride Accepted");

    subscription.cancel();
    assert_eq!(store.listener_count().expect("count"), 0);
}

#[test]
fn dropped_subscription_receives_nothing() {
    let store = Arc::new(InMemoryRideStore::with_seed(7));
    let mut booking = new_booking(&store);
    booking.quote("mini").expect("quote");
    let ride_id = booking.confirm().expect("confirm");

    let (seen, callback) = recorder();
    let subscription = booking.watch(&ride_id, callback).expect("watch");
    drop(subscription);

    store
        .update_status(&ride_id, RideStatus::Rejected)
        .expect("reject");
    assert!(seen.lock().expect("seen").is_empty());
}

#[test]
fn listeners_only_hear_their_own_ride() {
    let store = Arc::new(InMemoryRideStore::with_seed(9));
    let mut booking = new_booking(&store);
    booking.quote("bike").expect("quote");
    let first = booking.confirm().expect("confirm");
    booking.quote("rickshaw").expect("quote");
    let second = booking.confirm().expect("confirm");

    let (seen, callback) = recorder();
    let _subscription = booking.watch(&first, callback).expect("watch");

    store
        .update_status(&second, RideStatus::Accepted)
        .expect("accept second");
    assert!(seen.lock().expect("seen").is_empty());

    store
        .update_status(&first, RideStatus::Rejected)
        .expect("reject first");
    assert_eq!(seen.lock().expect("seen").len(), 1);
}

#[test]
fn callback_may_query_the_store() {
    let store = Arc::new(InMemoryRideStore::with_seed(13));
    let mut booking = new_booking(&store);
    booking.quote("ac_car").expect("quote");
    let ride_id = booking.confirm().expect("confirm");

    let observed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&observed);
    let reader = Arc::clone(&store);
    let _subscription = booking
        .watch(
            &ride_id,
            Box::new(move |change: &StatusChange| {
                let ride = reader
                    .get_ride(&change.ride_id)
                    .expect("store usable from callback");
                *sink.lock().expect("sink") = ride.map(|ride| ride.status);
            }),
        )
        .expect("watch");

    store
        .update_status(&ride_id, RideStatus::Accepted)
        .expect("accept");
    assert_eq!(*observed.lock().expect("observed"), Some(RideStatus::Accepted));
}

#[test]
fn failures_map_to_rider_messages() {
    let store = Arc::new(InMemoryRideStore::with_seed(21));
    let mut booking = new_booking(&store);

    assert_eq!(
        booking.confirm().expect_err("no quote").user_message(),
        "Fare or vehicle type is missing."
    );

    let error = booking
        .watch(&ride_core::RideId::new("nope"), Box::new(|_: &StatusChange| {}))
        .expect_err("unknown ride");
    assert!(matches!(error, BookingError::Watch(StoreError::NotFound(_))));
    assert_eq!(
        error.user_message(),
        "Unable to follow this ride's status. Please try again."
    );
}

#[test]
fn identical_pickup_and_dropoff_cannot_be_booked() {
    let store = Arc::new(InMemoryRideStore::with_seed(3));
    let mut params = karachi_params();
    params.dropoff_latitude = params.pickup_latitude.clone();
    params.dropoff_longitude = params.pickup_longitude.clone();
    let mut booking =
        RideBooking::from_params(FareEstimator::standard(), &params, Arc::clone(&store))
            .expect("valid params");

    let error = booking.quote("bike").expect_err("zero distance");
    assert_eq!(
        error.user_message(),
        "Unable to calculate fare. Please check inputs."
    );
    assert!(matches!(booking.confirm(), Err(BookingError::NoQuote)));
    assert!(store.is_empty().expect("empty"));
}
