use domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Google Maps API key is not configured (set HIVE__PLACES__API_KEY)")]
    MissingApiKey,

    #[error("Places service error: {0}")]
    ServiceError(String),

    #[error("Invalid response from places service: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not read crop dataset: {0}")]
    Dataset(String),

    #[error("Could not write output: {0}")]
    Output(#[source] std::io::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    pub(crate) fn from_request(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            AppError::Timeout(timeout_ms)
        } else {
            AppError::Http(err)
        }
    }

    /// Maps a collaborator failure onto the domain vocabulary.
    pub fn into_network_error(self) -> DomainError {
        match self {
            AppError::Domain(e) => e,
            other => DomainError::NetworkUnavailable(other.to_string()),
        }
    }
}
