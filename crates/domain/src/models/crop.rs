//! Crop flowering window model and the bundled dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::Coordinates;

/// A static crop entry with its flowering window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropDefinition {
    pub id: String,
    pub name: String,
    pub flowering_start: NaiveDate,
    pub flowering_end: NaiveDate,
    pub location: Coordinates,
    /// Hives per acre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_hive_density: Option<u32>,
}

impl CropDefinition {
    /// Window ends before it starts.
    pub fn is_malformed(&self) -> bool {
        self.flowering_end < self.flowering_start
    }

    pub fn is_currently_flowering(&self, today: NaiveDate) -> bool {
        today >= self.flowering_start && today <= self.flowering_end
    }

    pub fn status(&self, today: NaiveDate) -> FloweringStatus {
        if self.is_currently_flowering(today) {
            FloweringStatus::FloweringNow
        } else {
            FloweringStatus::Upcoming
        }
    }

    /// E.g. `Apr 5 - Apr 20`.
    pub fn format_flowering_window(&self) -> String {
        format!(
            "{} - {}",
            self.flowering_start.format("%b %-d"),
            self.flowering_end.format("%b %-d")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FloweringStatus {
    FloweringNow,
    Upcoming,
}

impl std::fmt::Display for FloweringStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FloweringStatus::FloweringNow => write!(f, "FLOWERING NOW"),
            FloweringStatus::Upcoming => write!(f, "UPCOMING"),
        }
    }
}

/// A crop with its distance from the current location, when known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedCrop {
    #[serde(flatten)]
    pub crop: CropDefinition,
    #[serde(rename = "distance", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl AnnotatedCrop {
    /// E.g. `12.3 km away`.
    pub fn distance_label(&self) -> Option<String> {
        self.distance_km.map(|d| format!("{d:.1} km away"))
    }
}

fn crop(
    id: &str,
    name: &str,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
    location: Coordinates,
    density: u32,
) -> Option<CropDefinition> {
    Some(CropDefinition {
        id: id.to_string(),
        name: name.to_string(),
        flowering_start: NaiveDate::from_ymd_opt(start.0, start.1, start.2)?,
        flowering_end: NaiveDate::from_ymd_opt(end.0, end.1, end.2)?,
        location,
        recommended_hive_density: Some(density),
    })
}

/// The crop dataset shipped with the application.
///
/// `crop_002` carries an inverted window on purpose; it mirrors the data
/// the app has always shipped and is skipped by the crop filter.
pub fn default_crops() -> Vec<CropDefinition> {
    let delhi = Coordinates::new(28.7041, 77.1025);
    [
        crop("crop_001", "Mustard", (2025, 4, 5), (2025, 4, 20), delhi, 4),
        crop("crop_002", "Onion", (2025, 5, 5), (2025, 4, 20), delhi, 4),
        crop("crop_003", "Potato", (2025, 2, 5), (2025, 3, 20), delhi, 4),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_crops() {
        let crops = default_crops();
        assert_eq!(crops.len(), 3);
        assert_eq!(crops[0].name, "Mustard");
        assert!(!crops[0].is_malformed());
        assert!(crops[1].is_malformed());
    }

    #[test]
    fn test_flowering_status() {
        let mustard = &default_crops()[0];
        assert_eq!(mustard.status(date(2025, 4, 10)), FloweringStatus::FloweringNow);
        assert_eq!(mustard.status(date(2025, 4, 5)), FloweringStatus::FloweringNow);
        assert_eq!(mustard.status(date(2025, 4, 20)), FloweringStatus::FloweringNow);
        assert_eq!(mustard.status(date(2025, 3, 30)), FloweringStatus::Upcoming);
        assert_eq!(FloweringStatus::FloweringNow.to_string(), "FLOWERING NOW");
    }

    #[test]
    fn test_format_flowering_window() {
        let mustard = &default_crops()[0];
        assert_eq!(mustard.format_flowering_window(), "Apr 5 - Apr 20");
    }

    #[test]
    fn test_distance_label() {
        let annotated = AnnotatedCrop {
            crop: default_crops()[0].clone(),
            distance_km: Some(12.345),
        };
        assert_eq!(annotated.distance_label().unwrap(), "12.3 km away");
    }

    #[test]
    fn test_crop_deserializes_from_dataset_json() {
        let json = r#"{
            "id": "crop_010",
            "name": "Sunflower",
            "flowering_start": "2025-06-01",
            "flowering_end": "2025-06-10",
            "location": {"latitude": 30.0, "longitude": 75.0}
        }"#;
        let crop: CropDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(crop.flowering_start, date(2025, 6, 1));
        assert!(crop.recommended_hive_density.is_none());
    }
}
