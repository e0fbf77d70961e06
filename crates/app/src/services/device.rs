//! Device location provider backed by configuration.
//!
//! Desktop hosts rarely expose a positioning service, so the "device" answers
//! permission prompts and position requests from `[device]` settings.

use async_trait::async_trait;
use domain::models::{Accuracy, PermissionState};
use domain::services::LocationProvider;
use domain::DomainError;
use shared::Coordinates;
use tracing::debug;

use crate::config::{Config, ConfigValidationError};

#[derive(Debug, Clone)]
pub struct ConfiguredLocationProvider {
    permission: PermissionState,
    position: Option<Coordinates>,
}

impl ConfiguredLocationProvider {
    pub fn new(permission: PermissionState, position: Option<Coordinates>) -> Self {
        Self {
            permission,
            position,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigValidationError> {
        let position = match (config.device.latitude, config.device.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        };
        Ok(Self::new(config.device_permission()?, position))
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocationProvider {
    async fn request_permission(&self) -> Result<PermissionState, DomainError> {
        debug!(permission = %self.permission, "Location permission requested");
        Ok(self.permission)
    }

    async fn current_position(&self, accuracy: Accuracy) -> Result<Coordinates, DomainError> {
        debug!(?accuracy, "Device position requested");
        self.position.ok_or_else(|| {
            DomainError::DeviceFixFailed("no device position configured".to_string())
        })
    }
}
