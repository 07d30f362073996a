//! Place name → coordinate resolution.
//!
//! Wraps an external geocoder (Nominatim) behind a persistent cache, with
//! hard-coded positions for capital cities. Geocoder failures never
//! propagate past [`GeocodeCache`]: an unresolvable place is `None`.

mod cache;
mod client;
mod error;
mod fallback;
mod store;

pub use cache::{GeocodeCache, GeocodeCacheConfig};
pub use client::{GeocodeCandidate, Geocoder, NominatimClient, NominatimConfig};
pub use error::{GeocodeError, StoreError};
pub use fallback::capital_city;
pub use store::{GeocodeStore, JsonFileStore};
