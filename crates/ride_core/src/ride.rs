//! Ride documents as persisted in the `Ride` collection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fare::FareEstimate;
use crate::geo::GeoPoint;
use crate::params::ParseError;
use crate::tier::VehicleTier;

/// Name of the document collection rides are written to.
pub const RIDE_COLLECTION: &str = "Ride";

/// Opaque store-generated ride identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(String);

impl RideId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RideStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Only a pending ride can move; accepted and rejected are final.
    pub fn can_transition_to(self, next: RideStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted) | (Self::Pending, Self::Rejected)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Rider-facing notice for this status.
    pub fn notice(self) -> &'static str {
        match self {
            Self::Pending => "Ride request is pending.",
            Self::Accepted => "Ride Accepted",
            Self::Rejected => "Ride Rejected",
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point with the labels the rider picked it by.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub point: GeoPoint,
    pub address: Option<String>,
    pub name: Option<String>,
}

impl Place {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            point,
            address: None,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RideRoute {
    pub pickup: Place,
    pub dropoff: Place,
}

/// A ride request document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RideDocument", try_from = "RideDocument")]
pub struct RideRequest {
    pub pickup: Place,
    pub dropoff: Place,
    pub fare: u64,
    pub vehicle: VehicleTier,
    pub status: RideStatus,
}

impl RideRequest {
    /// A fresh `pending` request for an accepted estimate.
    pub fn pending(route: &RideRoute, estimate: &FareEstimate) -> Self {
        Self {
            pickup: route.pickup.clone(),
            dropoff: route.dropoff.clone(),
            fare: estimate.fare,
            vehicle: estimate.tier,
            status: RideStatus::Pending,
        }
    }
}

/// Status transition delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub ride_id: RideId,
    pub previous: RideStatus,
    pub current: RideStatus,
}

// Wire layout of the collection document. Field names are prefixed per side.

#[derive(Serialize, Deserialize)]
struct RideDocument {
    pickup: PickupFields,
    #[serde(rename = "dropOff")]
    drop_off: DropoffFields,
    fare: u64,
    vehicle: VehicleTier,
    status: RideStatus,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PickupFields {
    pickup_latitude: f64,
    pickup_longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pickup_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pickup_name: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DropoffFields {
    dropoff_latitude: f64,
    dropoff_longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dropoff_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dropoff_name: Option<String>,
}

impl From<RideRequest> for RideDocument {
    fn from(ride: RideRequest) -> Self {
        Self {
            pickup: PickupFields {
                pickup_latitude: ride.pickup.point.latitude(),
                pickup_longitude: ride.pickup.point.longitude(),
                pickup_address: ride.pickup.address,
                pickup_name: ride.pickup.name,
            },
            drop_off: DropoffFields {
                dropoff_latitude: ride.dropoff.point.latitude(),
                dropoff_longitude: ride.dropoff.point.longitude(),
                dropoff_address: ride.dropoff.address,
                dropoff_name: ride.dropoff.name,
            },
            fare: ride.fare,
            vehicle: ride.vehicle,
            status: ride.status,
        }
    }
}

impl TryFrom<RideDocument> for RideRequest {
    type Error = ParseError;

    fn try_from(doc: RideDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            pickup: Place {
                point: GeoPoint::new(doc.pickup.pickup_latitude, doc.pickup.pickup_longitude)?,
                address: doc.pickup.pickup_address,
                name: doc.pickup.pickup_name,
            },
            dropoff: Place {
                point: GeoPoint::new(
                    doc.drop_off.dropoff_latitude,
                    doc.drop_off.dropoff_longitude,
                )?,
                address: doc.drop_off.dropoff_address,
                name: doc.drop_off.dropoff_name,
            },
            fare: doc.fare,
            vehicle: doc.vehicle,
            status: doc.status,
        })
    }
}
