//! Hard-coded positions for capital cities.
//!
//! These resolve without touching the cache or the geocoder, so the
//! most common lookups keep working when the geocoder is unreachable.

use crate::domain::{Coordinate, LocationQuery};

/// (city, CBD postcode, latitude, longitude)
const CAPITALS: &[(&str, &str, f64, f64)] = &[
    ("melbourne", "3000", -37.8136, 144.9631),
    ("sydney", "2000", -33.8688, 151.2093),
    ("brisbane", "4000", -27.4698, 153.0251),
    ("adelaide", "5000", -34.9285, 138.6007),
    ("perth", "6000", -31.9505, 115.8605),
    ("hobart", "7000", -42.8821, 147.3272),
    ("darwin", "0800", -12.4634, 130.8456),
    ("canberra", "2600", -35.2809, 149.1300),
];

/// Fixed position for a capital city, if `query` names one.
///
/// Matches on the city name with either no postcode or the CBD postcode;
/// "melbourne 3004" is left to the geocoder.
pub fn capital_city(query: &LocationQuery) -> Option<Coordinate> {
    CAPITALS
        .iter()
        .find(|(city, postcode, _, _)| {
            query.place() == *city && query.postcode().is_none_or(|p| p == *postcode)
        })
        .and_then(|&(_, _, lat, lng)| Coordinate::new(lat, lng).ok())
}
