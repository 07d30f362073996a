//! Normalized place lookups and range queries.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Separator between place and postcode in persisted cache keys.
const KEY_SEPARATOR: char = '|';

/// Error returned when a lookup request is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidQuery {
    #[error("place name must not be empty")]
    EmptyPlace,

    #[error("radius must be a finite, non-negative number of kilometres")]
    InvalidRadius,
}

/// A place lookup, normalized so that it can serve as a cache key.
///
/// The place name is trimmed, lower-cased and has internal whitespace runs
/// collapsed to a single space. An empty or blank postcode counts as absent.
///
/// # Examples
///
/// ```
/// use fuel_server::domain::LocationQuery;
///
/// let a = LocationQuery::new("  Camberwell ", None).unwrap();
/// let b = LocationQuery::new("CAMBERWELL", Some("")).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.cache_key(), "camberwell");
///
/// let c = LocationQuery::new("Camberwell", Some("3124")).unwrap();
/// assert_ne!(a, c);
/// assert_eq!(c.cache_key(), "camberwell|3124");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LocationQuery {
    place: String,
    postcode: Option<String>,
}

impl LocationQuery {
    /// Normalize a place and optional postcode.
    pub fn new(place: &str, postcode: Option<&str>) -> Result<Self, InvalidQuery> {
        let place = normalize(place);
        if place.is_empty() {
            return Err(InvalidQuery::EmptyPlace);
        }

        let postcode = postcode.map(normalize).filter(|p| !p.is_empty());

        Ok(Self { place, postcode })
    }

    /// Rebuild a query from a persisted cache key.
    pub fn from_cache_key(key: &str) -> Result<Self, InvalidQuery> {
        match key.split_once(KEY_SEPARATOR) {
            Some((place, postcode)) => Self::new(place, Some(postcode)),
            None => Self::new(key, None),
        }
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn postcode(&self) -> Option<&str> {
        self.postcode.as_deref()
    }

    /// Stable string form used as the persisted key.
    ///
    /// Place-only queries use the bare place so that keys match files
    /// written before postcodes were part of the key.
    pub fn cache_key(&self) -> String {
        match &self.postcode {
            Some(postcode) => format!("{}{}{}", self.place, KEY_SEPARATOR, postcode),
            None => self.place.clone(),
        }
    }

    /// Free text sent to an external geocoder, qualified by country.
    pub fn geocoder_text(&self, country: &str) -> String {
        match &self.postcode {
            Some(postcode) => format!("{} {}, {}", self.place, postcode, country),
            None => format!("{}, {}", self.place, country),
        }
    }
}

impl fmt::Debug for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocationQuery({})", self.cache_key())
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.postcode {
            Some(postcode) => write!(f, "{} {}", self.place, postcode),
            None => f.write_str(&self.place),
        }
    }
}

/// Lowercase, collapse whitespace. The key separator counts as whitespace
/// so a normalized part can never contain it.
fn normalize(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == KEY_SEPARATOR)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A location plus search radius; the key of the result cache.
#[derive(Debug, Clone)]
pub struct RangeQuery {
    location: LocationQuery,
    radius_km: f64,
}

impl RangeQuery {
    /// Build a range query. The radius must be finite and non-negative.
    pub fn new(location: LocationQuery, radius_km: f64) -> Result<Self, InvalidQuery> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(InvalidQuery::InvalidRadius);
        }

        // -0.0 and 0.0 must hash alike
        let radius_km = if radius_km == 0.0 { 0.0 } else { radius_km };

        Ok(Self {
            location,
            radius_km,
        })
    }

    pub fn location(&self) -> &LocationQuery {
        &self.location
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }
}

impl PartialEq for RangeQuery {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && self.radius_km.to_bits() == other.radius_km.to_bits()
    }
}

impl Eq for RangeQuery {}

impl Hash for RangeQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
        self.radius_km.to_bits().hash(state);
    }
}
