//! Memoized lookup results.
//!
//! Once a (place, radius) lookup has been computed, the same response is
//! served for the life of the process. Entries never expire and are not
//! invalidated when the station catalog refreshes; repeated requests may
//! therefore see a result older than the catalog until
//! [`ResultCache::invalidate_all`] is called.

use std::sync::Arc;

use moka::future::Cache as MokaCache;
use tracing::{debug, info};

use crate::domain::RangeQuery;
use crate::lookup::RangeResult;

/// Cached result entry.
type ResultEntry = Arc<RangeResult>;

/// Unbounded (place, radius) → result memo.
///
/// Concurrent computations of the same query may both insert; the last
/// write wins, and both results are equally valid.
pub struct ResultCache {
    results: MokaCache<RangeQuery, ResultEntry>,
}

impl ResultCache {
    /// Create an empty cache with no TTL and no capacity bound.
    pub fn new() -> Self {
        Self {
            results: MokaCache::builder().build(),
        }
    }

    /// Get a cached result.
    pub async fn get(&self, query: &RangeQuery) -> Option<ResultEntry> {
        let hit = self.results.get(query).await;
        debug!(
            location = %query.location(),
            radius_km = query.radius_km(),
            hit = hit.is_some(),
            "result cache lookup"
        );
        hit
    }

    /// Insert a result, replacing any previous entry for the same query.
    pub async fn put(&self, query: RangeQuery, result: ResultEntry) {
        self.results.insert(query, result).await;
    }

    /// Approximate number of entries (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.results.entry_count()
    }

    /// Drop every cached result and return how many there were.
    ///
    /// Pending inserts are applied first so the count includes them.
    pub async fn invalidate_all(&self) -> u64 {
        self.results.run_pending_tasks().await;
        let entries = self.entry_count();
        info!(entries, "invalidating result cache");
        self.results.invalidate_all();
        entries
    }

    #[cfg(test)]
    pub(crate) async fn sync(&self) {
        self.results.run_pending_tasks().await;
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}
