//! Ride store: the injected persistence collaborator.
//!
//! The fare estimator never touches a store. Callers that want to persist a
//! ride hold a [`RideStore`] and go through create/query/subscribe. Listener
//! lifetime is owned by the caller through a [`Subscription`].
//!
//! [`InMemoryRideStore`] is the in-process implementation used by the CLI and
//! tests.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::ride::{RideId, RideRequest, RideStatus, StatusChange, RIDE_COLLECTION};

/// Length of generated ride ids.
pub const RIDE_ID_LEN: usize = 20;

pub type StatusCallback = Box<dyn Fn(&StatusChange) + Send + Sync>;

type SharedCallback = Arc<dyn Fn(&StatusChange) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("ride {0} not found")]
    NotFound(RideId),
    #[error("ride {ride_id} cannot move from {from} to {to}")]
    InvalidTransition {
        ride_id: RideId,
        from: RideStatus,
        to: RideStatus,
    },
    #[error("ride store unavailable: {0}")]
    Unavailable(String),
}

/// Minimal document-store interface for ride requests.
pub trait RideStore: Send + Sync {
    /// Persist a new ride and return its generated id. Never overwrites.
    fn create_ride(&self, ride: RideRequest) -> Result<RideId, StoreError>;

    fn get_ride(&self, id: &RideId) -> Result<Option<RideRequest>, StoreError>;

    /// All rides currently in `status`, ordered by id.
    fn rides_with_status(&self, status: RideStatus)
        -> Result<Vec<(RideId, RideRequest)>, StoreError>;

    /// Move a ride to `status`. Setting the current status again is a no-op.
    fn update_status(&self, id: &RideId, status: RideStatus) -> Result<(), StoreError>;

    /// Listen for status changes of one ride until the handle is cancelled.
    fn on_status_change(
        &self,
        id: &RideId,
        callback: StatusCallback,
    ) -> Result<Subscription, StoreError>;
}

impl<S: RideStore + ?Sized> RideStore for Arc<S> {
    fn create_ride(&self, ride: RideRequest) -> Result<RideId, StoreError> {
        (**self).create_ride(ride)
    }

    fn get_ride(&self, id: &RideId) -> Result<Option<RideRequest>, StoreError> {
        (**self).get_ride(id)
    }

    fn rides_with_status(
        &self,
        status: RideStatus,
    ) -> Result<Vec<(RideId, RideRequest)>, StoreError> {
        (**self).rides_with_status(status)
    }

    fn update_status(&self, id: &RideId, status: RideStatus) -> Result<(), StoreError> {
        (**self).update_status(id, status)
    }

    fn on_status_change(
        &self,
        id: &RideId,
        callback: StatusCallback,
    ) -> Result<Subscription, StoreError> {
        (**self).on_status_change(id, callback)
    }
}

/// Owned listener registration.
///
/// `cancel` releases the listener; dropping the handle does the same. Once
/// cancellation has returned, every dispatch skips the listener, including a
/// dispatch already under way that has not reached it yet. A call another
/// thread already started is allowed to finish.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap the store-specific release action.
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

struct Listener {
    ride_id: RideId,
    // Cleared on cancel; dispatch checks it right before each call.
    active: Arc<AtomicBool>,
    callback: SharedCallback,
}

struct StoreState {
    rides: BTreeMap<RideId, RideRequest>,
    listeners: HashMap<u64, Listener>,
    next_listener_id: u64,
    rng: StdRng,
}

impl StoreState {
    fn generate_id(&mut self) -> RideId {
        loop {
            let raw: String = (&mut self.rng)
                .sample_iter(&Alphanumeric)
                .take(RIDE_ID_LEN)
                .map(char::from)
                .collect();
            let id = RideId::new(raw);
            if !self.rides.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Thread-safe in-process ride collection.
#[derive(Clone)]
pub struct InMemoryRideStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryRideStore {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Store whose generated ids are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                rides: BTreeMap::new(),
                listeners: HashMap::new(),
                next_listener_id: 0,
                rng,
            })),
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.rides.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.rides.is_empty())
    }

    /// Number of live listeners across all rides.
    pub fn listener_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.listeners.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("ride store mutex poisoned".to_string()))
    }
}

impl Default for InMemoryRideStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryRideStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRideStore").finish_non_exhaustive()
    }
}

impl RideStore for InMemoryRideStore {
    fn create_ride(&self, ride: RideRequest) -> Result<RideId, StoreError> {
        let mut state = self.lock()?;
        let id = state.generate_id();
        info!(
            collection = RIDE_COLLECTION,
            ride_id = %id,
            vehicle = %ride.vehicle,
            fare = ride.fare,
            status = %ride.status,
            "created ride"
        );
        state.rides.insert(id.clone(), ride);
        Ok(id)
    }

    fn get_ride(&self, id: &RideId) -> Result<Option<RideRequest>, StoreError> {
        Ok(self.lock()?.rides.get(id).cloned())
    }

    fn rides_with_status(
        &self,
        status: RideStatus,
    ) -> Result<Vec<(RideId, RideRequest)>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .rides
            .iter()
            .filter(|(_, ride)| ride.status == status)
            .map(|(id, ride)| (id.clone(), ride.clone()))
            .collect())
    }

    fn update_status(&self, id: &RideId, status: RideStatus) -> Result<(), StoreError> {
        let (change, callbacks) = {
            let mut state = self.lock()?;
            let ride = state
                .rides
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            let previous = ride.status;
            if previous == status {
                return Ok(());
            }
            if !previous.can_transition_to(status) {
                warn!(ride_id = %id, from = %previous, to = %status, "rejected status transition");
                return Err(StoreError::InvalidTransition {
                    ride_id: id.clone(),
                    from: previous,
                    to: status,
                });
            }
            ride.status = status;

            // Listener ids grow monotonically, so sorting keeps registration order.
            let mut matching: Vec<(u64, Arc<AtomicBool>, SharedCallback)> = state
                .listeners
                .iter()
                .filter(|(_, listener)| listener.ride_id == *id)
                .map(|(key, listener)| {
                    (
                        *key,
                        Arc::clone(&listener.active),
                        Arc::clone(&listener.callback),
                    )
                })
                .collect();
            matching.sort_by_key(|(key, _, _)| *key);
            let change = StatusChange {
                ride_id: id.clone(),
                previous,
                current: status,
            };
            (change, matching)
        };

        info!(
            ride_id = %change.ride_id,
            from = %change.previous,
            to = %change.current,
            listeners = callbacks.len(),
            "ride status changed"
        );
        for (key, active, callback) in callbacks {
            // An earlier callback may have cancelled this one.
            if !active.load(Ordering::SeqCst) {
                debug!(listener = key, "skipped cancelled listener");
                continue;
            }
            callback(&change);
        }
        Ok(())
    }

    fn on_status_change(
        &self,
        id: &RideId,
        callback: StatusCallback,
    ) -> Result<Subscription, StoreError> {
        let mut state = self.lock()?;
        if !state.rides.contains_key(id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        let key = state.next_listener_id;
        state.next_listener_id += 1;
        let active = Arc::new(AtomicBool::new(true));
        state.listeners.insert(
            key,
            Listener {
                ride_id: id.clone(),
                active: Arc::clone(&active),
                callback: Arc::from(callback),
            },
        );
        debug!(ride_id = %id, listener = key, "subscribed to ride status");

        let weak: Weak<Mutex<StoreState>> = Arc::downgrade(&self.state);
        Ok(Subscription::new(move || {
            active.store(false, Ordering::SeqCst);
            let Some(state) = weak.upgrade() else {
                return;
            };
            // A poisoned store can no longer deliver anything; nothing to release.
            if let Ok(mut state) = state.lock() {
                if state.listeners.remove(&key).is_some() {
                    debug!(listener = key, "cancelled ride status subscription");
                }
            };
        }))
    }
}
