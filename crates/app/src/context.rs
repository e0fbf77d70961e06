//! Wiring of stores, services and collaborators for one process.

use std::sync::Arc;
use std::time::Duration;

use domain::models::{default_crops, CropDefinition};
use domain::services::{
    HiveRepository, LocationProvider, LocationSession, PlaceSearch, ReverseGeocoder,
    SearchDebouncer,
};
use persistence::{FileKeyValueStore, KeyValueStore, KvHiveStore, KvLocationStore};
use shared::{Clock, SystemClock};
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::services::{
    ConfiguredLocationProvider, ConnectivityMonitor, ConnectivityProbe, GoogleGeocoder,
    GooglePlacesClient, HttpProbe,
};

pub type HiveRepo = HiveRepository<KvHiveStore<Arc<dyn KeyValueStore>>>;

/// External collaborators; swapped for fakes in tests.
pub struct Collaborators {
    pub kv: Arc<dyn KeyValueStore>,
    pub provider: Arc<dyn LocationProvider>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub places: Arc<dyn PlaceSearch>,
    pub probe: Arc<dyn ConnectivityProbe>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Production collaborators described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let provider = ConfiguredLocationProvider::from_config(config)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        Ok(Self {
            kv: Arc::new(FileKeyValueStore::new(&config.storage.data_dir)),
            provider: Arc::new(provider),
            geocoder: Arc::new(GoogleGeocoder::new(config.places.clone())?),
            places: Arc::new(GooglePlacesClient::new(config.places.clone())?),
            probe: Arc::new(HttpProbe::new(&config.connectivity)?),
            clock: Arc::new(SystemClock),
        })
    }
}

pub struct AppContext {
    pub config: Config,
    pub hives: HiveRepo,
    pub location: Arc<LocationSession>,
    pub places: Arc<dyn PlaceSearch>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub crops: Vec<CropDefinition>,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let collaborators = Collaborators::from_config(&config)?;
        Self::with_collaborators(config, collaborators).await
    }

    pub async fn with_collaborators(
        config: Config,
        collaborators: Collaborators,
    ) -> Result<Self, AppError> {
        let Collaborators {
            kv,
            provider,
            geocoder,
            places,
            probe,
            clock,
        } = collaborators;

        let hives = HiveRepository::open(KvHiveStore::new(kv.clone())).await;
        let location = Arc::new(LocationSession::new(
            provider,
            geocoder,
            Arc::new(KvLocationStore::new(kv)),
            clock.clone(),
            config.session_settings(),
        ));
        let connectivity = Arc::new(ConnectivityMonitor::new(
            probe,
            Duration::from_secs(config.connectivity.interval_secs),
        ));
        let crops = load_crops(&config).await?;

        info!(
            data_dir = %config.storage.data_dir.display(),
            crops = crops.len(),
            "Application context ready"
        );

        Ok(Self {
            config,
            hives,
            location,
            places,
            connectivity,
            crops,
            clock,
        })
    }

    pub fn search_debouncer(&self) -> SearchDebouncer {
        SearchDebouncer::new(self.places.clone(), self.config.debounce_settings())
    }
}

/// The configured crop dataset, or the bundled one.
async fn load_crops(config: &Config) -> Result<Vec<CropDefinition>, AppError> {
    let Some(path) = &config.crops.dataset else {
        return Ok(default_crops());
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Dataset(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| AppError::Dataset(format!("{}: {}", path.display(), e)))
}
