//! End-to-end booking against the in-memory store: quote every tier, book a
//! bike, and have a driver accept it.
//!
//! Run with: cargo run -p ride_core --example booking_flow

use std::sync::Arc;

use ride_core::params::{DROPOFF_LATITUDE, DROPOFF_LONGITUDE, PICKUP_LATITUDE, PICKUP_LONGITUDE};
use ride_core::{
    FareEstimator, InMemoryRideStore, RideBooking, RideStatus, RideStore, RouteParams,
    StatusChange, VehicleTier,
};

fn main() {
    let params = RouteParams::from_pairs([
        (PICKUP_LATITUDE, "24.8607"),
        (PICKUP_LONGITUDE, "67.0011"),
        (DROPOFF_LATITUDE, "24.9056"),
        (DROPOFF_LONGITUDE, "67.0822"),
    ]);
    let store = Arc::new(InMemoryRideStore::with_seed(42));
    let mut booking = RideBooking::from_params(FareEstimator::standard(), &params, Arc::clone(&store))
        .expect("example route is valid");

    for tier in VehicleTier::ALL {
        match booking.quote(tier.as_str()) {
            Ok(estimate) => println!(
                "{:<10} {:>6.2} km  fare {:>5}",
                tier.label(),
                estimate.distance_km,
                estimate.fare
            ),
            Err(error) => println!("{:<10} {}", tier.label(), error.user_message()),
        }
    }

    booking.quote("bike").expect("bike is configured");
    let ride_id = booking.confirm().expect("in-memory store accepts rides");
    println!("submitted ride {ride_id}");

    let subscription = booking
        .watch(
            &ride_id,
            Box::new(|change: &StatusChange| {
                println!(
                    "ride {} moved {} -> {}",
                    change.ride_id, change.previous, change.current
                );
            }),
        )
        .expect("ride exists");

    store
        .update_status(&ride_id, RideStatus::Accepted)
        .expect("pending ride can be accepted");
    subscription.cancel();
}
