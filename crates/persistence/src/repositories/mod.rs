//! Store implementations backed by a [`KeyValueStore`](crate::kv::KeyValueStore).

pub mod hive;
pub mod location;

pub use hive::{KvHiveStore, HIVE_STORAGE_KEY};
pub use location::{KvLocationStore, LOCATION_STORAGE_KEY};
