//! Shared utilities and common types for Hive Logger.
//!
//! This crate provides common functionality used across all other crates:
//! - Great-circle distance (haversine)
//! - Common validation logic for coordinates, dates and identifiers
//! - A clock abstraction so time-dependent logic stays testable

pub mod clock;
pub mod geo;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use geo::{distance_km, Coordinates, EARTH_RADIUS_KM};
