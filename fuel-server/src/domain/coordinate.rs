//! Geographic coordinates and great-circle distance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Error returned when a latitude/longitude pair is out of range or not finite.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate ({lat}, {lng}): {reason}")]
pub struct InvalidCoordinate {
    lat: f64,
    lng: f64,
    reason: &'static str,
}

/// A WGS84 position in degrees.
///
/// Latitude is within [-90, 90] and longitude within [-180, 180]; values
/// built through [`Coordinate::new`] or [`Coordinate::parse`] are valid by
/// construction.
///
/// # Examples
///
/// ```
/// use fuel_server::domain::Coordinate;
///
/// let melbourne = Coordinate::new(-37.8136, 144.9631).unwrap();
/// assert_eq!(melbourne.lat(), -37.8136);
///
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// assert!(Coordinate::parse("-37.8", "not a number").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting NaN, infinities and out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinate> {
        let err = |reason| InvalidCoordinate { lat, lng, reason };

        if !lat.is_finite() || !lng.is_finite() {
            return Err(err("not a finite number"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(err("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(err("longitude must be within [-180, 180]"));
        }

        Ok(Self { lat, lng })
    }

    /// Parse a coordinate from textual latitude and longitude.
    pub fn parse(lat: &str, lng: &str) -> Result<Self, InvalidCoordinate> {
        let parse = |s: &str| s.trim().parse::<f64>().unwrap_or(f64::NAN);
        Self::new(parse(lat), parse(lng))
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.lat, self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// On-disk shape of a coordinate: `{"lat": .., "lng": ..}`.
#[derive(Serialize, Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lng)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        RawCoordinate {
            lat: c.lat,
            lng: c.lng,
        }
    }
}

/// Great-circle distance between two coordinates in kilometres (haversine).
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h just past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn distance_to_self_is_zero() {
        let c = coord(-37.8136, 144.9631);
        assert_eq!(distance_km(c, c), 0.0);
    }

    #[test]
    fn melbourne_to_sydney() {
        let melbourne = coord(-37.8136, 144.9631);
        let sydney = coord(-33.8688, 151.2093);

        // Roughly 714 km as the crow flies
        let d = distance_km(melbourne, sydney);
        assert!((d - 713.4).abs() < 2.0, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance_km(coord(0.0, 0.0), coord(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(-90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.5).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn accepts_boundaries() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn parse_text() {
        let c = Coordinate::parse(" -37.83 ", "145.06").unwrap();
        assert_eq!(c.lat(), -37.83);
        assert_eq!(c.lng(), 145.06);

        assert!(Coordinate::parse("", "145.06").is_err());
        assert!(Coordinate::parse("abc", "145.06").is_err());
        assert!(Coordinate::parse("-37.83", "None").is_err());
    }

    #[test]
    fn serde_shape() {
        let c = coord(-37.83, 145.06);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"lat":-37.83,"lng":145.06}"#);

        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);

        assert!(serde_json::from_str::<Coordinate>(r#"{"lat":123.0,"lng":0.0}"#).is_err());
    }

    #[test]
    fn display_is_url_friendly() {
        assert_eq!(coord(-37.5, 145.25).to_string(), "-37.5,145.25");
    }
}
