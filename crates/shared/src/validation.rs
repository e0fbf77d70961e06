//! Common validation utilities.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Maximum allowed future tolerance in seconds (5 minutes for clock skew).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 300;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that an identifier is not blank once trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Please enter a Hive ID".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a placement date is not after `now`.
/// A few minutes of clock skew are tolerated.
pub fn validate_not_future_at(
    date: &DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    let future_limit = now + chrono::Duration::seconds(MAX_FUTURE_TOLERANCE_SECS);
    if *date > future_limit {
        let mut err = ValidationError::new("date_future");
        err.message = Some("Date of placement cannot be in the future".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a radius filter is a positive, finite number of kilometres.
pub fn validate_radius_km(radius: f64) -> Result<(), ValidationError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("radius_range");
        err.message = Some("Radius must be a positive number of kilometres".into());
        Err(err)
    }
}
