//! User location state machine.
//!
//! A [`LocationSession`] decides whether a cached snapshot can be reused,
//! asks the device for a fresh fix when it cannot, and falls back to manual
//! entry when the device is unavailable. Every acquisition carries a
//! generation ticket; results for a ticket that is no longer current are
//! dropped, so a newer refresh or a manual confirmation always wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared::{Clock, Coordinates};
use tokio::sync::{watch, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::DomainError;
use crate::models::{
    Accuracy, LocationSnapshot, LocationSource, PermissionState, PersistedLocation,
    PlaceSelection, PostalAddress, STALENESS_THRESHOLD_MILLIS,
};

/// Device location access.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Prompts for (or reports) foreground location permission.
    async fn request_permission(&self) -> Result<PermissionState, DomainError>;

    async fn current_position(&self, accuracy: Accuracy) -> Result<Coordinates, DomainError>;
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(&self, at: Coordinates) -> Result<PostalAddress, DomainError>;
}

/// Save port for the persisted location state.
#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn load(&self) -> Result<PersistedLocation, DomainError>;

    async fn save(&self, location: &PersistedLocation) -> Result<(), DomainError>;
}

/// Why no device location is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    PermissionDenied,
    DeviceFixFailed,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::PermissionDenied => write!(f, "location permission denied"),
            DenialReason::DeviceFixFailed => write!(f, "could not get a device fix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LocationState {
    #[default]
    Unknown,
    Requesting,
    Available(LocationSnapshot),
    Denied(DenialReason),
    ManualPending,
}

impl LocationState {
    pub fn snapshot(&self) -> Option<&LocationSnapshot> {
        match self {
            LocationState::Available(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    fn outcome_label(&self) -> &'static str {
        match self {
            LocationState::Available(_) => "available",
            LocationState::Denied(DenialReason::PermissionDenied) => "permission_denied",
            LocationState::Denied(DenialReason::DeviceFixFailed) => "fix_failed",
            LocationState::Unknown => "unknown",
            LocationState::Requesting => "requesting",
            LocationState::ManualPending => "manual_pending",
        }
    }
}

/// Timing knobs for a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub staleness_threshold: Duration,
    /// Upper bound for each device or geocoder call.
    pub fix_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            staleness_threshold: Duration::from_millis(STALENESS_THRESHOLD_MILLIS as u64),
            fix_timeout: Duration::from_secs(15),
        }
    }
}

struct SessionInner {
    state: LocationState,
    persisted: PersistedLocation,
}

pub struct LocationSession {
    provider: Arc<dyn LocationProvider>,
    geocoder: Arc<dyn ReverseGeocoder>,
    store: Arc<dyn LocationStore>,
    clock: Arc<dyn Clock>,
    settings: SessionSettings,
    inner: RwLock<SessionInner>,
    generation: AtomicU64,
    state_tx: watch::Sender<LocationState>,
}

impl LocationSession {
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        geocoder: Arc<dyn ReverseGeocoder>,
        store: Arc<dyn LocationStore>,
        clock: Arc<dyn Clock>,
        settings: SessionSettings,
    ) -> Self {
        let (state_tx, _) = watch::channel(LocationState::Unknown);
        Self {
            provider,
            geocoder,
            store,
            clock,
            settings,
            inner: RwLock::new(SessionInner {
                state: LocationState::Unknown,
                persisted: PersistedLocation::default(),
            }),
            generation: AtomicU64::new(0),
            state_tx,
        }
    }

    /// Observes state transitions.
    pub fn subscribe(&self) -> watch::Receiver<LocationState> {
        self.state_tx.subscribe()
    }

    pub async fn state(&self) -> LocationState {
        self.inner.read().await.state.clone()
    }

    pub async fn permission(&self) -> PermissionState {
        self.inner.read().await.persisted.permission
    }

    pub async fn is_manually_entered(&self) -> bool {
        self.inner.read().await.persisted.is_manually_entered
    }

    /// The cached snapshot, stale or not.
    pub async fn last_known(&self) -> Option<LocationSnapshot> {
        self.inner.read().await.persisted.snapshot.clone()
    }

    /// Coordinates of the current `Available` snapshot.
    pub async fn current_coordinates(&self) -> Option<Coordinates> {
        self.inner
            .read()
            .await
            .state
            .snapshot()
            .map(LocationSnapshot::coordinates)
    }

    fn threshold_millis(&self) -> i64 {
        i64::try_from(self.settings.staleness_threshold.as_millis()).unwrap_or(i64::MAX)
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    fn publish(&self, inner: &mut SessionInner, state: LocationState) {
        inner.state = state.clone();
        self.state_tx.send_replace(state);
    }

    async fn persist(&self, persisted: &PersistedLocation) {
        if let Err(e) = self.store.save(persisted).await {
            metrics::counter!("storage_write_failures_total", "store" => "location").increment(1);
            warn!(error = %e, "Failed to persist location state");
        }
    }

    /// Applies a finished acquisition if its ticket is still current.
    async fn commit<F>(&self, ticket: u64, apply: F) -> Option<LocationState>
    where
        F: FnOnce(&mut PersistedLocation) -> LocationState,
    {
        let mut inner = self.inner.write().await;
        if !self.is_current(ticket) {
            debug!(ticket, "Discarding superseded location result");
            return None;
        }
        let state = apply(&mut inner.persisted);
        self.publish(&mut inner, state.clone());
        self.persist(&inner.persisted).await;
        Some(state)
    }

    /// Loads persisted state and settles on whatever it supports without
    /// prompting: a fresh cached snapshot, a remembered denial, or `Unknown`.
    pub async fn restore(&self) -> LocationState {
        let persisted = match self.store.load().await {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!(error = %e, "Failed to load location state, starting fresh");
                PersistedLocation::default()
            }
        };

        let now = self.clock.now_millis();
        let settled = match &persisted.snapshot {
            Some(snapshot)
                if persisted.permission != PermissionState::Undetermined
                    && !snapshot.is_stale_at(now, self.threshold_millis()) =>
            {
                debug!(age_ms = now - snapshot.timestamp, "Reusing cached location");
                LocationState::Available(snapshot.clone())
            }
            _ if persisted.permission == PermissionState::Denied => {
                debug!("Permission previously denied, not prompting again");
                LocationState::Denied(DenialReason::PermissionDenied)
            }
            _ => LocationState::Unknown,
        };

        self.next_ticket();
        let mut inner = self.inner.write().await;
        inner.persisted = persisted;
        self.publish(&mut inner, settled.clone());
        settled
    }

    /// [`restore`](Self::restore), then asks the device when nothing usable
    /// was cached.
    pub async fn initialize(&self) -> LocationState {
        match self.restore().await {
            LocationState::Unknown => self.refresh().await,
            settled => settled,
        }
    }

    /// Discards the current result and asks the device again.
    pub async fn refresh(&self) -> LocationState {
        let ticket = self.next_ticket();
        self.acquire(ticket).await
    }

    async fn acquire(&self, ticket: u64) -> LocationState {
        {
            let mut inner = self.inner.write().await;
            if !self.is_current(ticket) {
                return inner.state.clone();
            }
            self.publish(&mut inner, LocationState::Requesting);
        }

        let outcome = self.fetch_device_location().await;
        let state = self
            .commit(ticket, |persisted| match outcome {
                DeviceOutcome::Fix(snapshot) => {
                    persisted.permission = PermissionState::Granted;
                    persisted.snapshot = Some(snapshot.clone());
                    persisted.is_manually_entered = false;
                    LocationState::Available(snapshot)
                }
                DeviceOutcome::Rejected(permission) => {
                    persisted.permission = permission;
                    LocationState::Denied(DenialReason::PermissionDenied)
                }
                DeviceOutcome::FixFailed => {
                    persisted.permission = PermissionState::Granted;
                    LocationState::Denied(DenialReason::DeviceFixFailed)
                }
                DeviceOutcome::PromptFailed => LocationState::Denied(DenialReason::DeviceFixFailed),
            })
            .await;

        match state {
            Some(state) => {
                metrics::counter!("location_acquisitions_total", "outcome" => state.outcome_label())
                    .increment(1);
                info!(outcome = state.outcome_label(), "Location acquisition finished");
                state
            }
            None => {
                metrics::counter!("location_acquisitions_total", "outcome" => "superseded")
                    .increment(1);
                self.state().await
            }
        }
    }

    async fn fetch_device_location(&self) -> DeviceOutcome {
        match self.provider.request_permission().await {
            Ok(PermissionState::Granted) => {}
            Ok(other) => {
                info!(permission = %other, "Location permission not granted");
                return DeviceOutcome::Rejected(if other == PermissionState::Undetermined {
                    PermissionState::Denied
                } else {
                    other
                });
            }
            Err(e) => {
                warn!(error = %e, "Location permission request failed");
                return DeviceOutcome::PromptFailed;
            }
        }

        let coordinates = match timeout(
            self.settings.fix_timeout,
            self.provider.current_position(Accuracy::High),
        )
        .await
        {
            Ok(Ok(coordinates)) => coordinates,
            Ok(Err(e)) => {
                warn!(error = %e, "Device location fix failed");
                return DeviceOutcome::FixFailed;
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.settings.fix_timeout.as_millis() as u64,
                    "Device location fix timed out"
                );
                return DeviceOutcome::FixFailed;
            }
        };

        let address = self.lookup_address(coordinates).await;
        DeviceOutcome::Fix(LocationSnapshot {
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            address,
            timestamp: self.clock.now_millis(),
            source: LocationSource::DeviceGps,
        })
    }

    /// Best effort; any failure just leaves the address empty.
    async fn lookup_address(&self, at: Coordinates) -> Option<String> {
        match timeout(self.settings.fix_timeout, self.geocoder.reverse_geocode(at)).await {
            Ok(Ok(address)) => address.formatted(),
            Ok(Err(e)) => {
                warn!(error = %e, "Reverse geocoding failed, keeping coordinates only");
                None
            }
            Err(_) => {
                warn!("Reverse geocoding timed out, keeping coordinates only");
                None
            }
        }
    }

    /// Switches to manual entry. Any in-flight acquisition is superseded.
    pub async fn request_manual_entry(&self) {
        self.next_ticket();
        let mut inner = self.inner.write().await;
        self.publish(&mut inner, LocationState::ManualPending);
        debug!("Waiting for manual location entry");
    }

    /// Stores a manually selected place as the current location.
    pub async fn confirm_manual(
        &self,
        selection: PlaceSelection,
    ) -> Result<LocationSnapshot, DomainError> {
        let coordinates = selection.coordinates();
        if shared::validation::validate_latitude(coordinates.latitude).is_err()
            || shared::validation::validate_longitude(coordinates.longitude).is_err()
        {
            return Err(DomainError::invalid(
                "location",
                "Selected place has invalid coordinates",
            ));
        }

        let mut inner = self.inner.write().await;
        if inner.state != LocationState::ManualPending {
            return Err(DomainError::invalid(
                "location",
                "Manual entry was not requested",
            ));
        }
        // Only an accepted confirmation may supersede an acquisition.
        let ticket = self.next_ticket();

        let snapshot = LocationSnapshot {
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            address: Some(selection.address),
            timestamp: self.clock.now_millis(),
            source: LocationSource::ManualEntry,
        };
        inner.persisted.snapshot = Some(snapshot.clone());
        inner.persisted.is_manually_entered = true;
        self.publish(&mut inner, LocationState::Available(snapshot.clone()));
        self.persist(&inner.persisted).await;
        info!(ticket, label = %snapshot.display_label(), "Manual location confirmed");
        Ok(snapshot)
    }

    /// Forgets the snapshot. The permission result is kept.
    pub async fn clear(&self) {
        self.next_ticket();
        let mut inner = self.inner.write().await;
        inner.persisted.snapshot = None;
        inner.persisted.is_manually_entered = false;
        self.publish(&mut inner, LocationState::Unknown);
        self.persist(&inner.persisted).await;
        info!("Location cleared");
    }
}

enum DeviceOutcome {
    Fix(LocationSnapshot),
    Rejected(PermissionState),
    FixFailed,
    PromptFailed,
}
