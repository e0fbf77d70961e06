//! Stored document definitions.
//!
//! Entities are direct mappings to the JSON documents kept under each key.

pub mod hive;
pub mod location;

pub use hive::{HiveDocument, HiveEntity};
pub use location::LocationDocument;
