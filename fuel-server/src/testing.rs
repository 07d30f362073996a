//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;

use crate::catalog::{SourceError, StationSource};
use crate::domain::{Coordinate, LocationQuery, StationRecord};
use crate::geocode::{GeocodeCandidate, GeocodeError, GeocodeStore, Geocoder, StoreError};

pub(crate) fn candidate(lat: f64, lon: f64, display_name: &str) -> GeocodeCandidate {
    GeocodeCandidate {
        lat: lat.to_string(),
        lon: lon.to_string(),
        display_name: display_name.to_string(),
    }
}

/// Geocoder answering from a fixed table, keyed by the exact query text.
///
/// Unknown text yields no candidates. Counts every call.
#[derive(Default)]
pub(crate) struct FakeGeocoder {
    answers: HashMap<String, Vec<GeocodeCandidate>>,
    failing: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeGeocoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_answer(mut self, text: &str, candidates: Vec<GeocodeCandidate>) -> Self {
        self.answers.insert(text.to_string(), candidates);
        self
    }

    /// Every call fails as if the network were down.
    pub(crate) fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for FakeGeocoder {
    fn search<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<Vec<GeocodeCandidate>, GeocodeError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing {
                return Err(GeocodeError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(self.answers.get(text).cloned().unwrap_or_default())
        })
    }
}

/// Geocode store held in memory. Counts saves.
#[derive(Default)]
pub(crate) struct MemoryStore {
    entries: Mutex<HashMap<LocationQuery, Coordinate>>,
    saves: AtomicUsize,
    fail_saves: bool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_saves() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub(crate) fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub(crate) fn snapshot(&self) -> HashMap<LocationQuery, Coordinate> {
        self.entries.lock().unwrap().clone()
    }
}

impl GeocodeStore for MemoryStore {
    fn load(&self) -> Result<HashMap<LocationQuery, Coordinate>, StoreError> {
        Ok(self.entries.lock().unwrap().clone())
    }

    fn save(&self, entries: &HashMap<LocationQuery, Coordinate>) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        *self.entries.lock().unwrap() = entries.clone();
        Ok(())
    }
}

/// Station source serving a replaceable list of records. Counts loads.
#[derive(Default)]
pub(crate) struct FakeSource {
    records: Mutex<Vec<StationRecord>>,
    failing: Mutex<bool>,
    loads: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn new(records: Vec<StationRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub(crate) fn set_records(&self, records: Vec<StationRecord>) {
        *self.records.lock().unwrap() = records;
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub(crate) fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn current(&self) -> Result<Vec<StationRecord>, SourceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if *self.failing.lock().unwrap() {
            return Err(SourceError::Unavailable("database locked".to_string()));
        }
        Ok(self.records.lock().unwrap().clone())
    }
}

impl StationSource for FakeSource {
    fn located_latest_prices(&self) -> BoxFuture<'_, Result<Vec<StationRecord>, SourceError>> {
        Box::pin(async move { self.current() })
    }

    fn latest_prices(&self) -> BoxFuture<'_, Result<Vec<StationRecord>, SourceError>> {
        Box::pin(async move { self.current() })
    }
}
