//! Reverse geocoding through the Google Geocoding API.

use std::time::Duration;

use async_trait::async_trait;
use domain::models::PostalAddress;
use domain::services::ReverseGeocoder;
use domain::DomainError;
use reqwest::Client;
use serde::Deserialize;
use shared::Coordinates;
use tracing::debug;

use crate::config::PlacesConfig;
use crate::error::AppError;
use crate::services::places::check_status;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl GeocodeResult {
    fn component(&self, kind: &str) -> Option<&str> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
            .map(|c| c.long_name.as_str())
    }

    fn to_postal_address(&self) -> PostalAddress {
        let street = match (self.component("street_number"), self.component("route")) {
            (Some(number), Some(route)) => Some(format!("{number} {route}")),
            (None, Some(route)) => Some(route.to_string()),
            _ => None,
        };
        PostalAddress {
            street,
            city: self
                .component("locality")
                .or_else(|| self.component("administrative_area_level_2"))
                .map(str::to_string),
            region: self.component("administrative_area_level_1").map(str::to_string),
            country: self.component("country").map(str::to_string),
        }
    }
}

pub(crate) fn parse_reverse_geocode(body: &str) -> Result<PostalAddress, AppError> {
    let response: GeocodeResponse =
        serde_json::from_str(body).map_err(|e| AppError::InvalidResponse(e.to_string()))?;
    check_status(&response.status, response.error_message)?;
    Ok(response
        .results
        .first()
        .map(GeocodeResult::to_postal_address)
        .unwrap_or_default())
}

pub struct GoogleGeocoder {
    client: Client,
    config: PlacesConfig,
}

impl GoogleGeocoder {
    pub fn new(config: PlacesConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { client, config })
    }

    pub async fn lookup(&self, at: Coordinates) -> Result<PostalAddress, AppError> {
        if self.config.api_key.is_empty() {
            return Err(AppError::MissingApiKey);
        }
        let url = format!("{}/geocode/json", self.config.base_url.trim_end_matches('/'));
        let latlng = format!("{},{}", at.latitude, at.longitude);
        debug!(latlng = %latlng, "Reverse geocoding");

        let response = self
            .client
            .get(&url)
            .query(&[("latlng", latlng.as_str()), ("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::from_request(e, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ServiceError(format!("HTTP {}", status)));
        }
        let body = response
            .text()
            .await
            .map_err(|e| AppError::from_request(e, self.config.timeout_ms))?;
        parse_reverse_geocode(&body)
    }
}

#[async_trait]
impl ReverseGeocoder for GoogleGeocoder {
    async fn reverse_geocode(&self, at: Coordinates) -> Result<PostalAddress, DomainError> {
        self.lookup(at)
            .await
            .map_err(|e| DomainError::GeocodeFailed(e.to_string()))
    }
}
