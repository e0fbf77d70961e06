//! Hive domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{
    validate_latitude, validate_longitude, validate_not_blank, validate_not_future_at,
};
use shared::Coordinates;
use validator::{Validate, ValidationErrors};

use crate::error::DomainError;

/// A logged hive placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiveRecord {
    pub hive_id: String,
    pub date_placed: DateTime<Utc>,
    pub num_colonies: u32,
    pub latitude: f64,
    pub longitude: f64,
}

impl HiveRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Checks every field invariant against the given "now".
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_not_blank(&self.hive_id) {
            errors.add("hive_id", e);
        }
        if self.num_colonies < 1 {
            let mut e = validator::ValidationError::new("range");
            e.message = Some("Please enter a valid number of colonies".into());
            errors.add("num_colonies", e);
        }
        if let Err(e) = validate_not_future_at(&self.date_placed, now) {
            errors.add("date_placed", e);
        }
        if let Err(e) = validate_latitude(self.latitude) {
            errors.add("latitude", e);
        }
        if let Err(e) = validate_longitude(self.longitude) {
            errors.add("longitude", e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}

/// Partial update for an existing hive. The id cannot be changed here;
/// renames go through [`crate::services::RenameCommand`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct HivePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_placed: Option<DateTime<Utc>>,

    #[validate(range(min = 1, message = "Please enter a valid number of colonies"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_colonies: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl HivePatch {
    /// A patch that replaces every mutable field with the values of `record`.
    pub fn from_record(record: &HiveRecord) -> Self {
        Self {
            date_placed: Some(record.date_placed),
            num_colonies: Some(record.num_colonies),
            latitude: Some(record.latitude),
            longitude: Some(record.longitude),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date_placed.is_none()
            && self.num_colonies.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }

    pub fn apply_to(&self, record: &mut HiveRecord) {
        if let Some(date_placed) = self.date_placed {
            record.date_placed = date_placed;
        }
        if let Some(num_colonies) = self.num_colonies {
            record.num_colonies = num_colonies;
        }
        if let Some(latitude) = self.latitude {
            record.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            record.longitude = longitude;
        }
    }

    /// Field validation plus the coordinate and date rules.
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let Some(date_placed) = &self.date_placed {
            if let Err(e) = validate_not_future_at(date_placed, now) {
                errors.add("date_placed", e);
            }
        }
        if let Some(latitude) = self.latitude {
            if let Err(e) = validate_latitude(latitude) {
                errors.add("latitude", e);
            }
        }
        if let Some(longitude) = self.longitude {
            if let Err(e) = validate_longitude(longitude) {
                errors.add("longitude", e);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}

/// Raw input of the create/edit form, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HiveForm {
    pub hive_id: String,
    /// Colony count as typed; parsed during validation.
    pub num_colonies: String,
    /// Defaults to "now" when not provided.
    pub date_placed: Option<DateTime<Utc>>,
    pub location: Option<Coordinates>,
}

impl HiveForm {
    /// Pre-fills the form from an existing record (edit flow).
    pub fn from_record(record: &HiveRecord) -> Self {
        Self {
            hive_id: record.hive_id.clone(),
            num_colonies: record.num_colonies.to_string(),
            date_placed: Some(record.date_placed),
            location: Some(record.coordinates()),
        }
    }

    /// Validates every field and builds the record, reporting all problems
    /// at once.
    pub fn validate_and_build(&self, now: DateTime<Utc>) -> Result<HiveRecord, DomainError> {
        let mut errors = ValidationErrors::new();

        let hive_id = self.hive_id.trim().to_string();
        if let Err(e) = validate_not_blank(&hive_id) {
            errors.add("hive_id", e);
        }

        let num_colonies = match self.num_colonies.trim().parse::<i64>() {
            Ok(n) if n >= 1 && n <= i64::from(u32::MAX) => Some(n as u32),
            _ => {
                let mut e = validator::ValidationError::new("num_colonies");
                e.message = Some("Please enter a valid number of colonies".into());
                errors.add("num_colonies", e);
                None
            }
        };

        let date_placed = self.date_placed.unwrap_or(now);
        if let Err(e) = validate_not_future_at(&date_placed, now) {
            errors.add("date_placed", e);
        }

        match &self.location {
            None => {
                let mut e = validator::ValidationError::new("required");
                e.message = Some("Location is required".into());
                errors.add("location", e);
            }
            Some(location) => {
                if let Err(e) = validate_latitude(location.latitude) {
                    errors.add("latitude", e);
                }
                if let Err(e) = validate_longitude(location.longitude) {
                    errors.add("longitude", e);
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }

        // Every branch that could leave these unset has recorded an error above.
        match (num_colonies, self.location) {
            (Some(num_colonies), Some(location)) => Ok(HiveRecord {
                hive_id,
                date_placed,
                num_colonies,
                latitude: location.latitude,
                longitude: location.longitude,
            }),
            _ => Err(DomainError::invalid("form", "Incomplete hive form")),
        }
    }
}
