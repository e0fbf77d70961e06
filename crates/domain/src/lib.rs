//! Domain layer for Hive Logger.
//!
//! This crate contains:
//! - Domain models (HiveRecord, LocationSnapshot, CropDefinition, places)
//! - Business logic services (hive repository, location session, filters)
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::{DomainError, FieldError};
