//! Range filtering, deduplication and ordering.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{Coordinate, StationRecord, distance_km};

/// Google Maps directions endpoint.
const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/?api=1";

/// A station inside the search radius.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMatch {
    pub record: StationRecord,
    /// Parsed station position
    pub coordinate: Coordinate,
    /// Distance from the query origin in km, rounded to 2 decimals
    pub distance_km: f64,
    /// Driving directions from the query origin to the station
    pub directions_url: String,
}

/// Stations within range of a place, nearest first, one entry per
/// observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeResult {
    stations: Vec<StationMatch>,
}

impl RangeResult {
    /// Filter `records` to those within `radius_km` of `origin`.
    ///
    /// - records without a parseable coordinate are skipped
    /// - duplicates by (station, address, postcode, date) keep the first seen
    /// - output is sorted by distance; equal distances keep input order
    pub fn within_radius(origin: Coordinate, radius_km: f64, records: &[StationRecord]) -> Self {
        let mut seen = HashSet::new();
        let mut found: Vec<(f64, &StationRecord, Coordinate)> = Vec::new();
        let mut skipped = 0usize;

        for record in records {
            let Some(coordinate) = record.coordinate() else {
                skipped += 1;
                continue;
            };

            let distance = distance_km(origin, coordinate);
            if distance > radius_km {
                continue;
            }

            if seen.insert(record.dedup_key()) {
                found.push((distance, record, coordinate));
            }
        }

        if skipped > 0 {
            debug!(skipped, "skipped station records with unusable coordinates");
        }

        // Stable: ties keep catalog order
        found.sort_by(|a, b| a.0.total_cmp(&b.0));

        let stations = found
            .into_iter()
            .map(|(distance, record, coordinate)| StationMatch {
                record: record.clone(),
                coordinate,
                distance_km: round_2dp(distance),
                directions_url: directions_url(origin, coordinate),
            })
            .collect();

        Self { stations }
    }

    pub fn stations(&self) -> &[StationMatch] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

fn round_2dp(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Directions link from `origin` to `destination`.
pub fn directions_url(origin: Coordinate, destination: Coordinate) -> String {
    format!("{DIRECTIONS_BASE_URL}&origin={origin}&destination={destination}")
}
