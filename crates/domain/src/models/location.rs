//! User location domain model.

use serde::{Deserialize, Serialize};
use shared::Coordinates;

/// Age after which a cached snapshot may no longer be reused silently.
pub const STALENESS_THRESHOLD_MILLIS: i64 = 60 * 60 * 1000;

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    DeviceGps,
    ManualEntry,
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationSource::DeviceGps => write!(f, "device_gps"),
            LocationSource::ManualEntry => write!(f, "manual_entry"),
        }
    }
}

/// Last-known OS location permission result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionState::Granted => write!(f, "granted"),
            PermissionState::Denied => write!(f, "denied"),
            PermissionState::Undetermined => write!(f, "undetermined"),
        }
    }
}

impl std::str::FromStr for PermissionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "granted" => Ok(PermissionState::Granted),
            "denied" => Ok(PermissionState::Denied),
            "undetermined" => Ok(PermissionState::Undetermined),
            other => Err(format!(
                "permission must be 'granted', 'denied' or 'undetermined', got '{other}'"
            )),
        }
    }
}

/// A single captured user-location reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Capture time in milliseconds since epoch.
    pub timestamp: i64,
    pub source: LocationSource,
}

impl LocationSnapshot {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Strictly older than `threshold_millis` at `now_millis`.
    pub fn is_stale_at(&self, now_millis: i64, threshold_millis: i64) -> bool {
        now_millis - self.timestamp > threshold_millis
    }

    pub fn is_stale(&self, now_millis: i64) -> bool {
        self.is_stale_at(now_millis, STALENESS_THRESHOLD_MILLIS)
    }

    /// The manual address when the user typed one in, otherwise `lat, lon`.
    pub fn display_label(&self) -> String {
        match (&self.source, &self.address) {
            (LocationSource::ManualEntry, Some(address)) => address.clone(),
            _ => self.coordinates().display_short(),
        }
    }
}

/// The whole persisted location state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedLocation {
    pub snapshot: Option<LocationSnapshot>,
    pub permission: PermissionState,
    pub is_manually_entered: bool,
}

/// Accuracy hint passed to the device provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accuracy {
    Balanced,
    #[default]
    High,
}

/// Postal address parts returned by a reverse geocoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl PostalAddress {
    /// Non-empty parts joined with ", "; `None` when nothing is known.
    pub fn formatted(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.street, &self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}
