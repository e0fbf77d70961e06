//! Location state document.

use domain::models::{LocationSnapshot, PermissionState, PersistedLocation};
use serde::{Deserialize, Serialize};

/// Stored under `location-storage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDocument {
    #[serde(default)]
    pub user_location: Option<LocationSnapshot>,
    #[serde(default)]
    pub location_permission_status: PermissionState,
    #[serde(default)]
    pub is_manually_entered: bool,
}

impl From<LocationDocument> for PersistedLocation {
    fn from(doc: LocationDocument) -> Self {
        Self {
            snapshot: doc.user_location,
            permission: doc.location_permission_status,
            is_manually_entered: doc.is_manually_entered,
        }
    }
}

impl From<&PersistedLocation> for LocationDocument {
    fn from(location: &PersistedLocation) -> Self {
        Self {
            user_location: location.snapshot.clone(),
            location_permission_status: location.permission,
            is_manually_entered: location.is_manually_entered,
        }
    }
}
