//! Domain services for Hive Logger.
//!
//! Services contain business logic that operates on domain models. I/O is
//! reached only through the collaborator traits declared here.

pub mod crop_filter;
pub mod hive_filter;
pub mod hive_repository;
pub mod location_session;
pub mod place_search;

pub use crop_filter::{filter_and_sort, DEFAULT_HORIZON_DAYS, MAX_HORIZON_DAYS};
pub use hive_filter::{filter, HiveFilter};
pub use hive_repository::{EditOutcome, HiveCollection, HiveRepository, HiveStore, RenameCommand};
pub use location_session::{
    DenialReason, LocationProvider, LocationSession, LocationState, LocationStore,
    ReverseGeocoder, SessionSettings,
};
pub use place_search::{DebounceSettings, PlaceSearch, SearchDebouncer};
