//! Google Places client for manual location entry.
//!
//! Autocomplete predictions restricted to geocodable results, and place
//! details limited to geometry and formatted address.

use std::time::Duration;

use async_trait::async_trait;
use domain::models::{PlaceSelection, PlaceSuggestion};
use domain::services::PlaceSearch;
use domain::DomainError;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::PlacesConfig;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<Prediction>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    place_id: String,
    description: String,
    #[serde(default)]
    structured_formatting: Option<StructuredFormatting>,
}

#[derive(Debug, Deserialize)]
struct StructuredFormatting {
    main_text: String,
    #[serde(default)]
    secondary_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<DetailsResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    formatted_address: Option<String>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Checks the `status` field Google returns alongside HTTP 200.
pub(crate) fn check_status(status: &str, error_message: Option<String>) -> Result<(), AppError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(AppError::ServiceError(
            error_message.unwrap_or_else(|| other.to_string()),
        )),
    }
}

pub(crate) fn parse_autocomplete(body: &str) -> Result<Vec<PlaceSuggestion>, AppError> {
    let response: AutocompleteResponse =
        serde_json::from_str(body).map_err(|e| AppError::InvalidResponse(e.to_string()))?;
    check_status(&response.status, response.error_message)?;

    Ok(response
        .predictions
        .into_iter()
        .map(|p| {
            let (main_text, secondary_text) = match p.structured_formatting {
                Some(f) => (f.main_text, f.secondary_text.unwrap_or_default()),
                None => (p.description.clone(), String::new()),
            };
            PlaceSuggestion {
                place_id: p.place_id,
                description: p.description,
                main_text,
                secondary_text,
            }
        })
        .collect())
}

/// A result without a formatted address yields an empty `address`.
pub(crate) fn parse_details(body: &str) -> Result<PlaceSelection, AppError> {
    let response: DetailsResponse =
        serde_json::from_str(body).map_err(|e| AppError::InvalidResponse(e.to_string()))?;
    check_status(&response.status, response.error_message)?;

    let result = response
        .result
        .ok_or_else(|| AppError::InvalidResponse("place details missing result".to_string()))?;
    Ok(PlaceSelection {
        latitude: result.geometry.location.lat,
        longitude: result.geometry.location.lng,
        address: result.formatted_address.unwrap_or_default(),
    })
}

/// Client for the Google Places web service.
pub struct GooglePlacesClient {
    client: Client,
    config: PlacesConfig,
}

impl GooglePlacesClient {
    pub fn new(config: PlacesConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, AppError> {
        if !self.is_configured() {
            return Err(AppError::MissingApiKey);
        }
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        debug!(url = %url, "Calling Places API");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::from_request(e, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ServiceError(format!("HTTP {}: {}", status, body)));
        }
        response
            .text()
            .await
            .map_err(|e| AppError::from_request(e, self.config.timeout_ms))
    }

    pub async fn fetch_suggestions(&self, input: &str) -> Result<Vec<PlaceSuggestion>, AppError> {
        let body = self
            .get_text(
                "place/autocomplete/json",
                &[("input", input), ("types", "geocode")],
            )
            .await?;
        parse_autocomplete(&body)
    }

    pub async fn fetch_details(&self, place_id: &str) -> Result<PlaceSelection, AppError> {
        let body = self
            .get_text(
                "place/details/json",
                &[("place_id", place_id), ("fields", "geometry,formatted_address")],
            )
            .await?;
        parse_details(&body)
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    async fn autocomplete(&self, query: &str) -> Result<Vec<PlaceSuggestion>, DomainError> {
        self.fetch_suggestions(query).await.map_err(|e| {
            warn!(error = %e, "Place autocomplete request failed");
            e.into_network_error()
        })
    }

    async fn details(&self, place_id: &str) -> Result<PlaceSelection, DomainError> {
        self.fetch_details(place_id)
            .await
            .map_err(AppError::into_network_error)
    }
}
