//! Location state store.

use async_trait::async_trait;
use domain::models::PersistedLocation;
use domain::services::LocationStore;
use domain::DomainError;

use crate::entities::LocationDocument;
use crate::error::StorageError;
use crate::kv::KeyValueStore;

pub const LOCATION_STORAGE_KEY: &str = "location-storage";

#[derive(Debug, Clone)]
pub struct KvLocationStore<K> {
    kv: K,
}

impl<K: KeyValueStore> KvLocationStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl<K: KeyValueStore> LocationStore for KvLocationStore<K> {
    async fn load(&self) -> Result<PersistedLocation, DomainError> {
        match self.kv.get(LOCATION_STORAGE_KEY).await? {
            Some(raw) => {
                let doc: LocationDocument = serde_json::from_str(&raw)
                    .map_err(|e| StorageError::serialization(LOCATION_STORAGE_KEY, e))?;
                Ok(doc.into())
            }
            None => Ok(PersistedLocation::default()),
        }
    }

    async fn save(&self, location: &PersistedLocation) -> Result<(), DomainError> {
        let raw = serde_json::to_string(&LocationDocument::from(location))
            .map_err(|e| StorageError::serialization(LOCATION_STORAGE_KEY, e))?;
        self.kv.set(LOCATION_STORAGE_KEY, &raw).await?;
        Ok(())
    }
}
