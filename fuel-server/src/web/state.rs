//! Application state for the web layer.

use std::sync::Arc;

use crate::catalog::StationSource;
use crate::lookup::LookupService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Stations-in-range lookup and its caches
    pub lookup: Arc<LookupService>,

    /// Uncached price listing
    pub prices: Arc<dyn StationSource>,
}

impl AppState {
    pub fn new(lookup: LookupService, prices: Arc<dyn StationSource>) -> Self {
        Self {
            lookup: Arc::new(lookup),
            prices,
        }
    }
}
