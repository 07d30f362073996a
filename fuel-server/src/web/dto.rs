//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogSnapshot;
use crate::domain::StationRecord;
use crate::lookup::StationMatch;

/// Query string of `/api/stations_in_range`.
///
/// Everything arrives as text so that validation errors come from the
/// lookup, not from the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct StationsInRangeRequest {
    /// Place name, e.g. "Camberwell"
    pub suburb: Option<String>,

    /// Optional postcode narrowing the place
    pub postcode: Option<String>,

    /// Radius in kilometres
    pub distance: Option<String>,
}

/// A station in range of the requested place.
#[derive(Debug, Serialize)]
pub struct StationEntry {
    pub postcode: String,
    pub suburb: String,
    pub station: String,
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,

    /// Observation time, "YYYY-MM-DD HH:MM:SS"
    pub date: String,

    /// Price in cents per litre
    pub price: Option<f64>,

    /// Distance from the requested place, 2 decimals
    pub distance_km: f64,

    /// Google Maps directions from the requested place
    pub gmaps_url: String,
}

/// Latest price for one station.
#[derive(Debug, Serialize)]
pub struct PriceEntry {
    pub postcode: String,
    pub suburb: String,
    pub station: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub date: String,
    pub price: Option<f64>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,

    /// Records in the loaded catalog, if loaded
    pub catalog_records: Option<usize>,

    /// When the catalog was loaded (RFC 3339)
    pub catalog_loaded_at: Option<String>,
}

/// Response for a catalog refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub records: usize,
}

/// Response for a result cache invalidation.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Number of results dropped
    pub invalidated: u64,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// "Did you mean" place name, for unresolvable places
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

// Conversion implementations

impl StationEntry {
    /// Create from a lookup match.
    pub fn from_match(m: &StationMatch) -> Self {
        let record = &m.record;
        Self {
            postcode: record.postcode.clone(),
            suburb: record.suburb.clone(),
            station: record.station.clone(),
            address: record.address.clone(),
            lat: m.coordinate.lat(),
            lng: m.coordinate.lng(),
            date: record.date.clone(),
            price: record.price,
            distance_km: m.distance_km,
            gmaps_url: m.directions_url.clone(),
        }
    }
}

impl PriceEntry {
    /// Create from a station record. Unparseable coordinates become null.
    pub fn from_record(record: StationRecord) -> Self {
        let parse = |s: Option<&str>| s.and_then(|s| s.trim().parse::<f64>().ok());
        Self {
            lat: parse(record.lat.as_deref()),
            lng: parse(record.lng.as_deref()),
            postcode: record.postcode,
            suburb: record.suburb,
            station: record.station,
            address: record.address,
            date: record.date,
            price: record.price,
        }
    }
}

impl HealthResponse {
    pub fn new(snapshot: Option<&CatalogSnapshot>) -> Self {
        Self {
            status: "ok",
            catalog_records: snapshot.map(CatalogSnapshot::len),
            catalog_loaded_at: snapshot.map(|s| s.loaded_at().to_rfc3339()),
        }
    }
}
