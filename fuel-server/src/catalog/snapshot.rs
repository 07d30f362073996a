//! In-memory station catalog.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::StationRecord;

use super::error::SourceError;
use super::source::StationSource;

/// An immutable, fully loaded copy of the located station records.
#[derive(Debug)]
pub struct CatalogSnapshot {
    records: Vec<StationRecord>,
    loaded_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    pub fn new(records: Vec<StationRecord>) -> Self {
        Self {
            records,
            loaded_at: Utc::now(),
        }
    }

    /// Records in backing-store order.
    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lazily loaded, explicitly refreshable station catalog.
///
/// Readers share the loaded snapshot; loading and refreshing take the
/// write lock, so nobody ever sees a partially built snapshot. A snapshot
/// is never mutated, only replaced.
pub struct StationCatalog {
    source: Arc<dyn StationSource>,
    snapshot: RwLock<Option<Arc<CatalogSnapshot>>>,
}

impl StationCatalog {
    pub fn new(source: Arc<dyn StationSource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(None),
        }
    }

    /// Return the loaded snapshot, loading it on first use.
    pub async fn load(&self) -> Result<Arc<CatalogSnapshot>, SourceError> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(snapshot.clone());
        }

        let mut guard = self.snapshot.write().await;

        // Someone else may have loaded while we waited for the write lock
        if let Some(snapshot) = guard.as_ref() {
            return Ok(snapshot.clone());
        }

        let snapshot = self.fetch().await?;
        *guard = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Discard the current snapshot and load a fresh one.
    ///
    /// If the reload fails the catalog is left unloaded and the next
    /// [`load`](Self::load) tries again. Cached lookup results are not
    /// touched.
    pub async fn refresh(&self) -> Result<Arc<CatalogSnapshot>, SourceError> {
        let mut guard = self.snapshot.write().await;
        *guard = None;

        let snapshot = self.fetch().await.inspect_err(|e| {
            warn!(error = %e, "station catalog refresh failed, catalog is now unloaded");
        })?;
        *guard = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// The current snapshot, if one is loaded. Never triggers a load.
    pub async fn current(&self) -> Option<Arc<CatalogSnapshot>> {
        self.snapshot.read().await.clone()
    }

    async fn fetch(&self) -> Result<Arc<CatalogSnapshot>, SourceError> {
        let records = self.source.located_latest_prices().await?;
        let snapshot = CatalogSnapshot::new(records);
        info!(records = snapshot.len(), "loaded station catalog");
        Ok(Arc::new(snapshot))
    }
}
