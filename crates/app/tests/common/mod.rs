//! Common test utilities for integration tests.
//!
//! Builds an [`AppContext`] over a temporary data directory with scripted
//! device, places and network collaborators.

// Not every integration test uses every helper.
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use domain::models::{Accuracy, PermissionState, PlaceSelection, PlaceSuggestion, PostalAddress};
use domain::services::{LocationProvider, PlaceSearch, ReverseGeocoder};
use domain::DomainError;
use hive_logger::services::ConnectivityProbe;
use hive_logger::{AppContext, Collaborators, Config};
use persistence::FileKeyValueStore;
use shared::{Coordinates, FixedClock};

/// 2025-04-10T12:00:00Z
pub const NOW_MILLIS: i64 = 1_744_286_400_000;

pub struct ScriptedDevice {
    pub permission: Mutex<PermissionState>,
    pub position: Mutex<Option<Coordinates>>,
    pub prompts: AtomicUsize,
}

impl ScriptedDevice {
    pub fn new(permission: PermissionState, position: Option<Coordinates>) -> Self {
        Self {
            permission: Mutex::new(permission),
            position: Mutex::new(position),
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for ScriptedDevice {
    async fn request_permission(&self) -> Result<PermissionState, DomainError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Ok(*self.permission.lock().unwrap())
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Coordinates, DomainError> {
        (*self.position.lock().unwrap())
            .ok_or_else(|| DomainError::DeviceFixFailed("no fix".to_string()))
    }
}

pub struct StaticGeocoder;

#[async_trait]
impl ReverseGeocoder for StaticGeocoder {
    async fn reverse_geocode(&self, _at: Coordinates) -> Result<PostalAddress, DomainError> {
        Ok(PostalAddress {
            street: Some("Janpath".to_string()),
            city: Some("New Delhi".to_string()),
            region: None,
            country: Some("India".to_string()),
        })
    }
}

#[derive(Default)]
pub struct ScriptedPlaces {
    pub queries: Mutex<Vec<String>>,
}

#[async_trait]
impl PlaceSearch for ScriptedPlaces {
    async fn autocomplete(&self, query: &str) -> Result<Vec<PlaceSuggestion>, DomainError> {
        self.queries.lock().unwrap().push(query.to_string());
        if query.to_lowercase().starts_with("mumbai") {
            Ok(vec![
                PlaceSuggestion {
                    place_id: "mumbai".to_string(),
                    description: "Mumbai, Maharashtra, India".to_string(),
                    main_text: "Mumbai".to_string(),
                    secondary_text: "Maharashtra, India".to_string(),
                },
                PlaceSuggestion {
                    place_id: "mumbai-central".to_string(),
                    description: "Mumbai Central, Mumbai, India".to_string(),
                    main_text: "Mumbai Central".to_string(),
                    secondary_text: "Mumbai, India".to_string(),
                },
            ])
        } else {
            Ok(Vec::new())
        }
    }

    async fn details(&self, place_id: &str) -> Result<PlaceSelection, DomainError> {
        match place_id {
            "mumbai" => Ok(PlaceSelection {
                latitude: 19.076,
                longitude: 72.8777,
                address: "Mumbai, Maharashtra, India".to_string(),
            }),
            // No formatted address; the suggestion text is used instead
            "mumbai-central" => Ok(PlaceSelection {
                latitude: 18.9690,
                longitude: 72.8205,
                address: String::new(),
            }),
            other => Err(DomainError::NotFound(other.to_string())),
        }
    }
}

#[derive(Default)]
pub struct SwitchProbe {
    pub online: AtomicBool,
}

#[async_trait]
impl ConnectivityProbe for SwitchProbe {
    async fn probe(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

pub struct TestApp {
    pub ctx: AppContext,
    pub device: Arc<ScriptedDevice>,
    pub places: Arc<ScriptedPlaces>,
    pub probe: Arc<SwitchProbe>,
    pub clock: Arc<FixedClock>,
}

/// Builds an app whose data lives under `data_dir`. Reusing a directory
/// simulates a restart.
pub async fn test_app(data_dir: &Path, device: ScriptedDevice) -> TestApp {
    test_app_with_clock(data_dir, device, NOW_MILLIS).await
}

pub async fn test_app_with_clock(data_dir: &Path, device: ScriptedDevice, now_millis: i64) -> TestApp {
    let data_dir_str = data_dir.to_string_lossy().to_string();
    let config = Config::load_for_test(&[
        ("storage.data_dir", data_dir_str.as_str()),
        ("location.search_debounce_ms", "20"),
    ])
    .expect("Failed to load config");

    let device = Arc::new(device);
    let places = Arc::new(ScriptedPlaces::default());
    let probe = Arc::new(SwitchProbe::default());
    let clock = Arc::new(FixedClock::new(now_millis));

    let collaborators = Collaborators {
        kv: Arc::new(FileKeyValueStore::new(data_dir)),
        provider: device.clone(),
        geocoder: Arc::new(StaticGeocoder),
        places: places.clone(),
        probe: probe.clone(),
        clock: clock.clone(),
    };
    let ctx = AppContext::with_collaborators(config, collaborators)
        .await
        .expect("Failed to build app context");

    TestApp {
        ctx,
        device,
        places,
        probe,
        clock,
    }
}

pub fn delhi() -> Coordinates {
    Coordinates::new(28.7041, 77.1025)
}
