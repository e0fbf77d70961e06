//! Place search models for manual location entry.

use serde::{Deserialize, Serialize};
use shared::Coordinates;

/// One autocomplete prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSuggestion {
    pub place_id: String,
    pub description: String,
    pub main_text: String,
    #[serde(default)]
    pub secondary_text: String,
}

/// A resolved place: exact coordinates and a formatted address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSelection {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

impl PlaceSelection {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}
