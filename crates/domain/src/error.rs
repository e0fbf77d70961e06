//! Domain error types.
//!
//! Device and network failures are absorbed by the services that call the
//! collaborators; they appear here so adapters have a common vocabulary.

use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// A single field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Could not get a device location fix: {0}")]
    DeviceFixFailed(String),

    #[error("Reverse geocoding failed: {0}")]
    GeocodeFailed(String),

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("A hive with ID '{0}' already exists")]
    DuplicateId(String),

    #[error("Hive '{0}' not found")]
    NotFound(String),

    #[error("Validation error: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("Storage error: {0}")]
    Storage(String),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    /// Shorthand for a single-field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        DomainError::Validation(details)
    }
}
