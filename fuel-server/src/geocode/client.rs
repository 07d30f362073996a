//! Nominatim geocoding client.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Coordinate, InvalidCoordinate};

use super::error::GeocodeError;

/// Default base URL for the public Nominatim instance.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying User-Agent.
const DEFAULT_USER_AGENT: &str = "petrol-forecast-bot";

/// Default request timeout. A slow geocoder must not hold a request forever.
const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// One ranked match from a geocoder.
///
/// Coordinates stay as the text the service returned; parsing happens
/// where the candidate is used so a malformed payload can be told apart
/// from an empty one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeCandidate {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

impl GeocodeCandidate {
    pub fn coordinate(&self) -> Result<Coordinate, InvalidCoordinate> {
        Coordinate::parse(&self.lat, &self.lon)
    }

    /// Short human-readable name: the first comma-delimited part of the
    /// display name, e.g. "Camberwell" from "Camberwell, Melbourne, ...".
    pub fn short_name(&self) -> Option<&str> {
        self.display_name
            .split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Free-text forward geocoding.
///
/// Implementations return candidates best-first. An empty vector means
/// the service had no match.
pub trait Geocoder: Send + Sync {
    fn search<'a>(&'a self, text: &'a str)
    -> BoxFuture<'a, Result<Vec<GeocodeCandidate>, GeocodeError>>;
}

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Sent as the User-Agent header
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NominatimConfig {
    /// Create a config pointing at the public Nominatim instance.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing or a self-hosted instance).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the Nominatim `/search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Create a new Nominatim client.
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| GeocodeError::NotConfigured("invalid User-Agent".to_string()))?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, text: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        debug!(query = text, "calling geocoder");

        let response = self
            .http
            .get(&url)
            .query(&[("format", "json"), ("q", text)])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
            message: e.to_string(),
        })
    }
}

impl Geocoder for NominatimClient {
    fn search<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<Vec<GeocodeCandidate>, GeocodeError>> {
        Box::pin(self.fetch(text))
    }
}
