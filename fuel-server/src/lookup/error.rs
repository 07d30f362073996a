//! Lookup error types.

use crate::catalog::SourceError;
use crate::domain::InvalidQuery;

/// Why a "stations in range" lookup produced no station list.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Missing or malformed place or radius. A client error.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The place could not be resolved to a coordinate.
    ///
    /// This is an expected outcome, not a failure: callers render it as a
    /// normal response, with the suggestion if there is one.
    #[error("Could not geocode suburb: {place}")]
    GeocodeFailed {
        place: String,
        suggestion: Option<String>,
    },

    /// The station catalog could not be loaded from the backing store.
    #[error("station catalog unavailable: {0}")]
    CatalogUnavailable(#[from] SourceError),
}

impl From<InvalidQuery> for LookupError {
    fn from(e: InvalidQuery) -> Self {
        LookupError::InvalidRequest(e.to_string())
    }
}
