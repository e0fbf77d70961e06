//! Hive repository: in-memory collection logic plus a persistence port.
//!
//! [`HiveCollection`] holds the pure mutation rules and never touches I/O.
//! [`HiveRepository`] wraps it behind an async mutex and writes the full
//! collection through a [`HiveStore`] after every mutation. A failed write is
//! logged and counted; the in-memory change stands.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::DomainError;
use crate::models::{HivePatch, HiveRecord};

/// Save port for the hive collection. Reads and writes are whole-collection.
#[async_trait]
pub trait HiveStore: Send + Sync {
    async fn load(&self) -> Result<Vec<HiveRecord>, DomainError>;

    async fn save(&self, hives: &[HiveRecord]) -> Result<(), DomainError>;
}

#[async_trait]
impl<T: HiveStore + ?Sized> HiveStore for std::sync::Arc<T> {
    async fn load(&self) -> Result<Vec<HiveRecord>, DomainError> {
        (**self).load().await
    }

    async fn save(&self, hives: &[HiveRecord]) -> Result<(), DomainError> {
        (**self).save(hives).await
    }
}

/// Ordered hive list with unique ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HiveCollection {
    hives: Vec<HiveRecord>,
}

impl HiveCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from loaded records. Later duplicates of an id
    /// are dropped so the uniqueness invariant holds from the start.
    pub fn from_records(records: Vec<HiveRecord>) -> Self {
        let mut collection = Self::new();
        for record in records {
            let hive_id = record.hive_id.clone();
            if collection.add(record).is_err() {
                warn!(hive_id = %hive_id, "Dropping duplicate hive found in storage");
            }
        }
        collection
    }

    pub fn add(&mut self, record: HiveRecord) -> Result<(), DomainError> {
        if self.contains(&record.hive_id) {
            return Err(DomainError::DuplicateId(record.hive_id));
        }
        self.hives.push(record);
        Ok(())
    }

    pub fn update(&mut self, hive_id: &str, patch: &HivePatch) -> bool {
        match self.hives.iter_mut().find(|h| h.hive_id == hive_id) {
            Some(record) => {
                patch.apply_to(record);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, hive_id: &str) -> bool {
        let before = self.hives.len();
        self.hives.retain(|h| h.hive_id != hive_id);
        self.hives.len() != before
    }

    pub fn find(&self, hive_id: &str) -> Option<&HiveRecord> {
        self.hives.iter().find(|h| h.hive_id == hive_id)
    }

    pub fn contains(&self, hive_id: &str) -> bool {
        self.find(hive_id).is_some()
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[HiveRecord] {
        &self.hives
    }

    pub fn len(&self) -> usize {
        self.hives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hives.is_empty()
    }

    pub fn clear(&mut self) {
        self.hives.clear();
    }

    /// Checks that a rename from `old_id` to `record.hive_id` can proceed.
    pub fn check_rename(&self, old_id: &str, record: &HiveRecord) -> Result<(), DomainError> {
        if !self.contains(old_id) {
            return Err(DomainError::NotFound(old_id.to_string()));
        }
        if record.hive_id != old_id && self.contains(&record.hive_id) {
            return Err(DomainError::DuplicateId(record.hive_id.clone()));
        }
        Ok(())
    }

    /// Removes the old record and appends the renamed one.
    pub fn rename(&mut self, command: RenameCommand) -> Result<(), DomainError> {
        self.check_rename(&command.old_id, &command.record)?;
        self.remove(&command.old_id);
        self.add(command.record)
    }
}

/// A confirmed-by-caller request to change a hive's id.
///
/// Changing the id creates a new hive: the old record is removed and the new
/// one appended. Callers obtain this from [`HiveRepository::plan_rename`],
/// ask the user, then pass it to [`HiveRepository::apply_rename`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenameCommand {
    old_id: String,
    record: HiveRecord,
}

impl RenameCommand {
    pub fn old_id(&self) -> &str {
        &self.old_id
    }

    pub fn new_id(&self) -> &str {
        &self.record.hive_id
    }

    pub fn record(&self) -> &HiveRecord {
        &self.record
    }
}

/// Result of saving the edit form.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Same id; fields replaced in place.
    Updated,
    /// The id changed; nothing has been written yet.
    RenameRequiresConfirmation(RenameCommand),
}

/// Owns the hive collection and keeps storage in step with it.
pub struct HiveRepository<S> {
    store: S,
    hives: Mutex<HiveCollection>,
}

impl<S: HiveStore> HiveRepository<S> {
    /// Loads the persisted collection. A load failure starts empty.
    pub async fn open(store: S) -> Self {
        let collection = match store.load().await {
            Ok(records) => {
                info!(count = records.len(), "Loaded hives from storage");
                HiveCollection::from_records(records)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load hives, starting with an empty list");
                HiveCollection::new()
            }
        };
        Self::with_collection(store, collection)
    }

    pub fn with_collection(store: S, collection: HiveCollection) -> Self {
        Self {
            store,
            hives: Mutex::new(collection),
        }
    }

    async fn persist(&self, hives: &HiveCollection) {
        if let Err(e) = self.store.save(hives.records()).await {
            metrics::counter!("storage_write_failures_total", "store" => "hives").increment(1);
            warn!(
                error = %e,
                count = hives.len(),
                "Failed to persist hives; keeping in-memory changes"
            );
        }
    }

    /// Adds a new hive. Rejects an id that already exists without changing
    /// the collection.
    pub async fn add(&self, record: HiveRecord) -> Result<(), DomainError> {
        let mut hives = self.hives.lock().await;
        let hive_id = record.hive_id.clone();
        hives.add(record)?;
        debug!(hive_id = %hive_id, "Hive added");
        self.persist(&hives).await;
        Ok(())
    }

    /// Applies a partial update. Returns `false` when the id is unknown.
    pub async fn update(&self, hive_id: &str, patch: &HivePatch) -> bool {
        let mut hives = self.hives.lock().await;
        if !hives.update(hive_id, patch) {
            debug!(hive_id = %hive_id, "Update skipped, hive not found");
            return false;
        }
        debug!(hive_id = %hive_id, "Hive updated");
        self.persist(&hives).await;
        true
    }

    /// Returns whether a record was removed.
    pub async fn remove(&self, hive_id: &str) -> bool {
        let mut hives = self.hives.lock().await;
        if !hives.remove(hive_id) {
            return false;
        }
        debug!(hive_id = %hive_id, "Hive removed");
        self.persist(&hives).await;
        true
    }

    pub async fn find_by_id(&self, hive_id: &str) -> Option<HiveRecord> {
        self.hives.lock().await.find(hive_id).cloned()
    }

    pub async fn list_all(&self) -> Vec<HiveRecord> {
        self.hives.lock().await.records().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.hives.lock().await.len()
    }

    pub async fn clear(&self) {
        let mut hives = self.hives.lock().await;
        let removed = hives.len();
        hives.clear();
        info!(removed, "All hives cleared");
        self.persist(&hives).await;
    }

    /// Validates a rename without applying it.
    pub async fn plan_rename(
        &self,
        old_id: &str,
        record: HiveRecord,
    ) -> Result<RenameCommand, DomainError> {
        self.hives.lock().await.check_rename(old_id, &record)?;
        Ok(RenameCommand {
            old_id: old_id.to_string(),
            record,
        })
    }

    /// Applies a confirmed rename as one mutation and one write.
    pub async fn apply_rename(&self, command: RenameCommand) -> Result<(), DomainError> {
        let mut hives = self.hives.lock().await;
        let (old_id, new_id) = (command.old_id.clone(), command.record.hive_id.clone());
        hives.rename(command)?;
        info!(old_id = %old_id, new_id = %new_id, "Hive renamed");
        self.persist(&hives).await;
        Ok(())
    }

    /// Saves the edit form for `original_id`: in-place when the id is
    /// unchanged, otherwise a rename the caller must confirm.
    pub async fn save_edit(
        &self,
        original_id: &str,
        record: HiveRecord,
    ) -> Result<EditOutcome, DomainError> {
        if record.hive_id == original_id {
            if self.update(original_id, &HivePatch::from_record(&record)).await {
                Ok(EditOutcome::Updated)
            } else {
                Err(DomainError::NotFound(original_id.to_string()))
            }
        } else {
            self.plan_rename(original_id, record)
                .await
                .map(EditOutcome::RenameRequiresConfirmation)
        }
    }
}
