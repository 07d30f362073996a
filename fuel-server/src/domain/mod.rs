//! Domain types for the fuel station lookup.
//!
//! Coordinates, normalized location queries and station observations.
//! Types enforce their invariants at construction time, so code that
//! receives them can trust their validity.

mod coordinate;
mod location;
mod station;

pub use coordinate::{Coordinate, EARTH_RADIUS_KM, InvalidCoordinate, distance_km};
pub use location::{InvalidQuery, LocationQuery, RangeQuery};
pub use station::{DedupKey, StationRecord};

#[cfg(test)]
pub(crate) use station::record;
