//! Station price observations.

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// The latest known price observation for one station.
///
/// Latitude and longitude are kept as the text the backing store holds;
/// use [`StationRecord::coordinate`] to get a validated position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub postcode: String,
    pub suburb: String,
    /// Station (brand + site) name
    pub station: String,
    pub address: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    /// Observation timestamp as recorded, e.g. "2025-07-01 08:15:00"
    pub date: String,
    pub price: Option<f64>,
}

/// Identity of one observation: (station, address, postcode, date).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey<'a> {
    station: &'a str,
    address: &'a str,
    postcode: &'a str,
    date: &'a str,
}

impl StationRecord {
    /// Parse the stored latitude/longitude, if present and valid.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.lat.as_deref()?;
        let lng = self.lng.as_deref()?;
        Coordinate::parse(lat, lng).ok()
    }

    /// Key under which duplicate observations of the same station collapse.
    ///
    /// A missing address and an empty one are the same key.
    pub fn dedup_key(&self) -> DedupKey<'_> {
        DedupKey {
            station: &self.station,
            address: self.address.as_deref().unwrap_or(""),
            postcode: &self.postcode,
            date: &self.date,
        }
    }
}

#[cfg(test)]
pub(crate) fn record(station: &str, lat: &str, lng: &str, date: &str) -> StationRecord {
    StationRecord {
        postcode: "3124".to_string(),
        suburb: "Camberwell".to_string(),
        station: station.to_string(),
        address: Some(format!("1 {station} Rd")),
        lat: Some(lat.to_string()),
        lng: Some(lng.to_string()),
        date: date.to_string(),
        price: Some(189.9),
    }
}
