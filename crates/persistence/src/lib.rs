//! Persistence layer for Hive Logger.
//!
//! This crate contains:
//! - Key-value blob stores (file-backed and in-memory)
//! - Entity definitions (stored JSON document mappings)
//! - Store implementations for the domain's persistence ports

pub mod entities;
pub mod error;
pub mod kv;
pub mod metrics;
pub mod repositories;

pub use error::StorageError;
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use repositories::{KvHiveStore, KvLocationStore, HIVE_STORAGE_KEY, LOCATION_STORAGE_KEY};
