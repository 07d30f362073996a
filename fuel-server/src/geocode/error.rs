//! Geocoding error types.

/// Errors from the external geocoder.
///
/// None of these are fatal to a lookup: callers treat every variant as
/// "no result".
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Geocoder returned an error status
    #[error("geocoder error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Client configuration was rejected (e.g. an invalid header value)
    #[error("not configured: {0}")]
    NotConfigured(String),
}

/// Errors from the durable geocode store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("geocode store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("geocode store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
