//! Fare estimation from straight-line trip distance.
//!
//! Formula: `fare = round(base_rate(tier) * distance_km(pickup, dropoff))`
//!
//! Every function here is pure. Persisting an accepted estimate is the
//! caller's job (see [`crate::booking`]).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::{distance_km, GeoPoint};
use crate::tier::{standard_rates, RateTable, VehicleTier};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FareError {
    /// The tier identifier has no configured base rate.
    #[error("unknown vehicle tier '{0}'")]
    UnknownTier(String),
    /// Rate times distance was non-finite, or rounded to nothing.
    #[error("invalid fare {raw_fare} for tier {tier} over {distance_km} km")]
    InvalidFare {
        tier: VehicleTier,
        distance_km: f64,
        raw_fare: f64,
    },
}

/// A priced trip for one tier. `fare` is always at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareEstimate {
    pub tier: VehicleTier,
    pub distance_km: f64,
    pub fare: u64,
}

impl FareEstimate {
    /// Rider-facing confirmation line.
    pub fn summary(&self) -> String {
        format!("Your Est. fare will be {}", self.fare)
    }
}

/// Price a trip for `tier` using `rates`.
pub fn estimate_fare(
    rates: &RateTable,
    tier: VehicleTier,
    pickup: GeoPoint,
    dropoff: GeoPoint,
) -> Result<FareEstimate, FareError> {
    let base_rate = rates
        .rate(tier)
        .ok_or_else(|| FareError::UnknownTier(tier.as_str().to_string()))?;
    let distance_km = distance_km(pickup, dropoff);
    let raw_fare = base_rate * distance_km;

    let invalid = || FareError::InvalidFare {
        tier,
        distance_km,
        raw_fare,
    };
    if !raw_fare.is_finite() || raw_fare <= 0.0 {
        return Err(invalid());
    }
    let rounded = raw_fare.round();
    // `as` saturates, so anything at or past u64::MAX is rejected rather than clamped.
    if rounded < 1.0 || rounded >= u64::MAX as f64 {
        return Err(invalid());
    }
    let fare = rounded as u64;

    debug!(tier = %tier, base_rate, distance_km, fare, "estimated fare");
    Ok(FareEstimate {
        tier,
        distance_km,
        fare,
    })
}

/// Like [`estimate_fare`], taking the tier as an untyped identifier.
pub fn estimate_fare_for_id(
    rates: &RateTable,
    tier_id: &str,
    pickup: GeoPoint,
    dropoff: GeoPoint,
) -> Result<FareEstimate, FareError> {
    let tier: VehicleTier = tier_id.parse()?;
    estimate_fare(rates, tier, pickup, dropoff)
}

/// Estimator bound to one rate table.
#[derive(Debug, Clone, Default)]
pub struct FareEstimator {
    rates: RateTable,
}

impl FareEstimator {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    /// Estimator over the built-in rates.
    pub fn standard() -> Self {
        Self::new(standard_rates().clone())
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn estimate(
        &self,
        tier: VehicleTier,
        pickup: GeoPoint,
        dropoff: GeoPoint,
    ) -> Result<FareEstimate, FareError> {
        estimate_fare(&self.rates, tier, pickup, dropoff)
    }

    pub fn estimate_id(
        &self,
        tier_id: &str,
        pickup: GeoPoint,
        dropoff: GeoPoint,
    ) -> Result<FareEstimate, FareError> {
        estimate_fare_for_id(&self.rates, tier_id, pickup, dropoff)
    }
}
