//! The "stations in range" lookup.
//!
//! Ties the three caches together:
//!
//! 1. validate the request and build a [`RangeQuery`]
//! 2. serve a memoized result if there is one
//! 3. resolve the place through the geocode cache
//! 4. filter the station catalog to the radius, dedupe and sort
//! 5. memoize and return

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::ResultCache;
use crate::catalog::{CatalogSnapshot, SourceError, StationCatalog};
use crate::domain::{LocationQuery, RangeQuery};
use crate::geocode::GeocodeCache;

use super::error::LookupError;
use super::result::RangeResult;

/// Parse a radius given as text, e.g. from a query string.
pub fn parse_radius(raw: Option<&str>) -> Result<f64, LookupError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LookupError::InvalidRequest("distance is required".to_string()))?;

    let radius: f64 = raw
        .parse()
        .map_err(|_| LookupError::InvalidRequest(format!("distance is not a number: {raw}")))?;

    if !radius.is_finite() {
        return Err(LookupError::InvalidRequest(format!(
            "distance is not a finite number: {raw}"
        )));
    }
    Ok(radius)
}

/// Lookup service shared by all request handlers.
pub struct LookupService {
    geocodes: Arc<GeocodeCache>,
    catalog: Arc<StationCatalog>,
    results: Arc<ResultCache>,
}

impl LookupService {
    pub fn new(
        geocodes: Arc<GeocodeCache>,
        catalog: Arc<StationCatalog>,
        results: Arc<ResultCache>,
    ) -> Self {
        Self {
            geocodes,
            catalog,
            results,
        }
    }

    /// Stations within `radius_km` of a place, nearest first.
    ///
    /// A repeated request is answered from the result cache with the
    /// identical result, even if the catalog has been refreshed since.
    pub async fn stations_in_range(
        &self,
        place: &str,
        postcode: Option<&str>,
        radius_km: f64,
    ) -> Result<Arc<RangeResult>, LookupError> {
        let location = LocationQuery::new(place, postcode)?;
        let query = RangeQuery::new(location, radius_km)?;

        if let Some(result) = self.results.get(&query).await {
            return Ok(result);
        }

        let Some(origin) = self.geocodes.resolve(query.location()).await else {
            let suggestion = self.geocodes.suggest(query.location()).await;
            info!(
                location = %query.location(),
                suggestion = suggestion.as_deref().unwrap_or(""),
                "could not resolve place"
            );
            return Err(LookupError::GeocodeFailed {
                place: place.trim().to_string(),
                suggestion,
            });
        };

        let catalog = self.catalog.load().await?;
        let result = Arc::new(RangeResult::within_radius(
            origin,
            query.radius_km(),
            catalog.records(),
        ));

        debug!(
            location = %query.location(),
            %origin,
            radius_km = query.radius_km(),
            catalog = catalog.len(),
            matches = result.len(),
            "computed stations in range"
        );

        self.results.put(query, result.clone()).await;
        Ok(result)
    }

    /// Reload the station catalog. Memoized results are kept.
    pub async fn refresh_catalog(&self) -> Result<Arc<CatalogSnapshot>, SourceError> {
        self.catalog.refresh().await
    }

    /// Drop every memoized lookup result, returning how many were dropped.
    pub async fn invalidate_results(&self) -> u64 {
        self.results.invalidate_all().await
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    pub fn results(&self) -> &ResultCache {
        &self.results
    }
}
