//! Vehicle tiers and their per-kilometre base rates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::fare::FareError;

/// Service class a rider can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleTier {
    Bike,
    Rickshaw,
    Mini,
    #[serde(alias = "AcCar")]
    AcCar,
}

impl VehicleTier {
    pub const ALL: [VehicleTier; 4] = [
        VehicleTier::Bike,
        VehicleTier::Rickshaw,
        VehicleTier::Mini,
        VehicleTier::AcCar,
    ];

    /// Canonical identifier, as stored in ride documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bike => "bike",
            Self::Rickshaw => "rickshaw",
            Self::Mini => "mini",
            Self::AcCar => "ac_car",
        }
    }

    /// Label shown on the tier card.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bike => "Bike",
            Self::Rickshaw => "Rickshaw",
            Self::Mini => "Mini",
            Self::AcCar => "Ac Car",
        }
    }
}

impl fmt::Display for VehicleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleTier {
    type Err = FareError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "bike" => Ok(Self::Bike),
            "rickshaw" => Ok(Self::Rickshaw),
            "mini" => Ok(Self::Mini),
            "ac_car" | "AcCar" => Ok(Self::AcCar),
            _ => Err(FareError::UnknownTier(raw.to_string())),
        }
    }
}

/// Base rate per kilometre for each configured tier.
///
/// Read-only once built. A table may leave tiers out; pricing an absent tier
/// fails with [`FareError::UnknownTier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: BTreeMap<VehicleTier, f64>,
}

impl RateTable {
    pub fn new(rates: impl IntoIterator<Item = (VehicleTier, f64)>) -> Self {
        Self {
            rates: rates.into_iter().collect(),
        }
    }

    /// Rates the rider app ships with.
    pub fn standard() -> Self {
        Self::new([
            (VehicleTier::Bike, 70.0),
            (VehicleTier::Rickshaw, 110.0),
            (VehicleTier::Mini, 170.0),
            (VehicleTier::AcCar, 224.0),
        ])
    }

    pub fn rate(&self, tier: VehicleTier) -> Option<f64> {
        self.rates.get(&tier).copied()
    }

    /// Configured tiers in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = (VehicleTier, f64)> + '_ {
        self.rates.iter().map(|(tier, rate)| (*tier, *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Process-wide standard rate table.
pub fn standard_rates() -> &'static RateTable {
    static RATES: OnceLock<RateTable> = OnceLock::new();
    RATES.get_or_init(RateTable::standard)
}
