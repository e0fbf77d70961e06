//! Hive collection store.

use async_trait::async_trait;
use domain::models::HiveRecord;
use domain::services::HiveStore;
use domain::DomainError;
use tracing::debug;

use crate::entities::HiveDocument;
use crate::error::StorageError;
use crate::kv::KeyValueStore;

pub const HIVE_STORAGE_KEY: &str = "hive-logger-storage";

/// Keeps the whole hive list as one JSON document.
#[derive(Debug, Clone)]
pub struct KvHiveStore<K> {
    kv: K,
}

impl<K: KeyValueStore> KvHiveStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl<K: KeyValueStore> HiveStore for KvHiveStore<K> {
    async fn load(&self) -> Result<Vec<HiveRecord>, DomainError> {
        let Some(raw) = self.kv.get(HIVE_STORAGE_KEY).await? else {
            debug!("No stored hives");
            return Ok(Vec::new());
        };
        let doc: HiveDocument = serde_json::from_str(&raw)
            .map_err(|e| StorageError::serialization(HIVE_STORAGE_KEY, e))?;
        Ok(doc.into_records())
    }

    async fn save(&self, hives: &[HiveRecord]) -> Result<(), DomainError> {
        let raw = serde_json::to_string(&HiveDocument::from_records(hives))
            .map_err(|e| StorageError::serialization(HIVE_STORAGE_KEY, e))?;
        self.kv.set(HIVE_STORAGE_KEY, &raw).await?;
        Ok(())
    }
}
