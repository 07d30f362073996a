//! Durable storage for resolved geocodes.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::domain::{Coordinate, LocationQuery};

use super::error::StoreError;

/// Whole-map persistence for the geocode cache.
///
/// The cache always writes a complete snapshot; there is no append.
pub trait GeocodeStore: Send + Sync {
    /// Load every stored entry. A store that has never been written is empty.
    fn load(&self) -> Result<HashMap<LocationQuery, Coordinate>, StoreError>;

    /// Replace the stored map with `entries`.
    fn save(&self, entries: &HashMap<LocationQuery, Coordinate>) -> Result<(), StoreError>;
}

/// Geocode store backed by a single JSON file.
///
/// The file is an object keyed by [`LocationQuery::cache_key`]:
///
/// ```json
/// {"camberwell": {"lat": -37.84, "lng": 145.07}}
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl GeocodeStore for JsonFileStore {
    fn load(&self) -> Result<HashMap<LocationQuery, Coordinate>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&contents)?;

        let mut entries = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let query = LocationQuery::from_cache_key(&key);
            let coordinate = serde_json::from_value::<Coordinate>(value);
            match (query, coordinate) {
                (Ok(query), Ok(coordinate)) => {
                    entries.insert(query, coordinate);
                }
                _ => warn!(key = %key, path = %self.path.display(), "skipping unreadable geocode entry"),
            }
        }

        Ok(entries)
    }

    /// Write to a sibling temp file, then rename over the target, so readers
    /// never see a half-written file.
    fn save(&self, entries: &HashMap<LocationQuery, Coordinate>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let ordered: BTreeMap<String, &Coordinate> = entries
            .iter()
            .map(|(query, coordinate)| (query.cache_key(), coordinate))
            .collect();
        let json = serde_json::to_string(&ordered)?;

        let tmp = self.temp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}
