//! Domain models for Hive Logger.

pub mod crop;
pub mod hive;
pub mod location;
pub mod place;

pub use crop::{default_crops, AnnotatedCrop, CropDefinition, FloweringStatus};
pub use hive::{HiveForm, HivePatch, HiveRecord};
pub use location::{
    Accuracy, LocationSnapshot, LocationSource, PermissionState, PersistedLocation,
    PostalAddress, STALENESS_THRESHOLD_MILLIS,
};
pub use place::{PlaceSelection, PlaceSuggestion};
