//! Stations-in-range lookup.
//!
//! Resolves a place to a coordinate, filters the station catalog to a
//! radius around it, and memoizes the answer.

mod error;
mod result;
mod service;


pub use error::LookupError;
pub use result::{RangeResult, StationMatch, directions_url};
pub use service::{LookupService, parse_radius};
