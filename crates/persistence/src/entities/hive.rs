//! Hive collection document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored hive, as written under `hive-logger-storage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiveEntity {
    pub hive_id: String,
    pub date_placed: DateTime<Utc>,
    pub num_colonies: u32,
    pub latitude: f64,
    pub longitude: f64,
}

/// `{ "hives": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HiveDocument {
    #[serde(default)]
    pub hives: Vec<HiveEntity>,
}

impl From<HiveEntity> for domain::models::HiveRecord {
    fn from(entity: HiveEntity) -> Self {
        Self {
            hive_id: entity.hive_id,
            date_placed: entity.date_placed,
            num_colonies: entity.num_colonies,
            latitude: entity.latitude,
            longitude: entity.longitude,
        }
    }
}

impl From<&domain::models::HiveRecord> for HiveEntity {
    fn from(record: &domain::models::HiveRecord) -> Self {
        Self {
            hive_id: record.hive_id.clone(),
            date_placed: record.date_placed,
            num_colonies: record.num_colonies,
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

impl HiveDocument {
    pub fn from_records(records: &[domain::models::HiveRecord]) -> Self {
        Self {
            hives: records.iter().map(HiveEntity::from).collect(),
        }
    }

    pub fn into_records(self) -> Vec<domain::models::HiveRecord> {
        self.hives.into_iter().map(Into::into).collect()
    }
}
