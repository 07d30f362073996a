//! Persistent geocode cache.
//!
//! Maps normalized place lookups to coordinates. The whole map is loaded
//! from the durable store on first use and written back in full after
//! every successful external lookup.
//!
//! Hits only take a read lock. A miss takes a lock for its own place,
//! covering the re-check and the geocoder call, so concurrent misses for
//! the same place call the geocoder once while misses for different places
//! proceed in parallel. Insert and persist happen under a separate store
//! lock, so file writes never interleave and each one holds every entry
//! inserted before it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, info, warn};

use crate::domain::{Coordinate, LocationQuery};

use super::client::{GeocodeCandidate, Geocoder};
use super::fallback::capital_city;
use super::store::GeocodeStore;

/// Default country appended to every geocoder query.
const DEFAULT_COUNTRY: &str = "Australia";

/// Upper bound on a single geocoder call, whatever the geocoder's own
/// timeout is.
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the geocode cache.
#[derive(Debug, Clone)]
pub struct GeocodeCacheConfig {
    /// Country qualifier appended to place text, e.g. "Australia"
    pub country: String,
    /// Upper bound on one geocoder call
    pub lookup_timeout: Duration,
}

impl Default for GeocodeCacheConfig {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

/// Place → coordinate cache with write-through persistence.
pub struct GeocodeCache {
    store: Arc<dyn GeocodeStore>,
    geocoder: Arc<dyn Geocoder>,
    config: GeocodeCacheConfig,
    /// Loaded from `store` on first access.
    entries: OnceCell<RwLock<HashMap<LocationQuery, Coordinate>>>,
    /// One lock per place with a miss in flight.
    in_flight: Mutex<HashMap<LocationQuery, Arc<Mutex<()>>>>,
    /// Held across insert and persist.
    persist: Mutex<()>,
}

impl GeocodeCache {
    pub fn new(
        store: Arc<dyn GeocodeStore>,
        geocoder: Arc<dyn Geocoder>,
        config: GeocodeCacheConfig,
    ) -> Self {
        Self {
            store,
            geocoder,
            config,
            entries: OnceCell::new(),
            in_flight: Mutex::new(HashMap::new()),
            persist: Mutex::new(()),
        }
    }

    /// Resolve a place to a coordinate.
    ///
    /// Order: capital-city fallback, then the cache, then one geocoder
    /// call. Returns `None` when the place cannot be resolved; geocoder and
    /// storage failures are logged, never returned.
    pub async fn resolve(&self, query: &LocationQuery) -> Option<Coordinate> {
        if let Some(coordinate) = capital_city(query) {
            debug!(%query, "capital city fallback");
            return Some(coordinate);
        }

        let entries = self.entries().await;

        if let Some(coordinate) = entries.read().await.get(query) {
            debug!(%query, "geocode cache hit");
            return Some(*coordinate);
        }

        let place_lock = self.place_lock(query).await;
        let resolved = {
            let _place = place_lock.lock().await;

            // Another request may have filled this key while we waited
            let cached = entries.read().await.get(query).copied();
            match cached {
                Some(coordinate) => {
                    debug!(%query, "geocode cache hit after wait");
                    Some(coordinate)
                }
                None => self.geocode_and_store(entries, query).await,
            }
        };
        self.release_place_lock(query, &place_lock).await;

        resolved
    }

    /// Best-effort "did you mean" for a place that failed to resolve.
    ///
    /// Makes one geocoder call, bypassing the cache, and returns the short
    /// name of the top candidate.
    pub async fn suggest(&self, query: &LocationQuery) -> Option<String> {
        let candidate = self.first_candidate(query).await?;
        candidate.short_name().map(str::to_string)
    }

    /// Number of cached entries (loads the store if needed).
    pub async fn len(&self) -> usize {
        self.entries().await.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn entries(&self) -> &RwLock<HashMap<LocationQuery, Coordinate>> {
        self.entries
            .get_or_init(|| async {
                let map = match self.store.load() {
                    Ok(map) => {
                        info!(entries = map.len(), "loaded geocode cache");
                        map
                    }
                    Err(e) => {
                        warn!(error = %e, "could not load geocode cache, starting empty");
                        HashMap::new()
                    }
                };
                RwLock::new(map)
            })
            .await
    }

    async fn geocode_and_store(
        &self,
        entries: &RwLock<HashMap<LocationQuery, Coordinate>>,
        query: &LocationQuery,
    ) -> Option<Coordinate> {
        debug!(%query, "geocode cache miss");
        let candidate = self.first_candidate(query).await?;
        let coordinate = match candidate.coordinate() {
            Ok(coordinate) => coordinate,
            Err(e) => {
                warn!(%query, error = %e, "geocoder returned a malformed candidate");
                return None;
            }
        };

        let _persist = self.persist.lock().await;
        let snapshot = {
            let mut map = entries.write().await;
            map.insert(query.clone(), coordinate);
            map.clone()
        };

        match self.store.save(&snapshot) {
            Ok(()) => info!(%query, %coordinate, entries = snapshot.len(), "geocoded and persisted"),
            Err(e) => warn!(%query, error = %e, "failed to persist geocode cache"),
        }

        Some(coordinate)
    }

    async fn place_lock(&self, query: &LocationQuery) -> Arc<Mutex<()>> {
        self.in_flight
            .lock()
            .await
            .entry(query.clone())
            .or_default()
            .clone()
    }

    /// Forget the place lock once nobody else is waiting on it.
    async fn release_place_lock(&self, query: &LocationQuery, lock: &Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().await;
        let ours = in_flight.get(query).is_some_and(|l| Arc::ptr_eq(l, lock));
        // The map and the caller hold the only references
        if ours && Arc::strong_count(lock) == 2 {
            in_flight.remove(query);
        }
    }

    #[cfg(test)]
    async fn places_in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// One bounded geocoder call; every failure collapses to `None`.
    async fn first_candidate(&self, query: &LocationQuery) -> Option<GeocodeCandidate> {
        let text = query.geocoder_text(&self.config.country);
        let lookup = self.geocoder.search(&text);

        match tokio::time::timeout(self.config.lookup_timeout, lookup).await {
            Ok(Ok(candidates)) => {
                let first = candidates.into_iter().next();
                if first.is_none() {
                    debug!(%query, "geocoder has no candidates");
                }
                first
            }
            Ok(Err(e)) => {
                warn!(%query, error = %e, "geocoder call failed");
                None
            }
            Err(_) => {
                warn!(%query, timeout = ?self.config.lookup_timeout, "geocoder call timed out");
                None
            }
        }
    }
}
