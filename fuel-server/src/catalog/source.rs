//! Backing store for station prices.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, Row};
use tracing::debug;

use crate::domain::StationRecord;

use super::error::SourceError;

/// Read access to the latest price per station.
///
/// "Latest" means the most recent observation for each
/// (postcode, suburb, station, address).
pub trait StationSource: Send + Sync {
    /// Latest records that carry a non-empty latitude and longitude.
    fn located_latest_prices(&self) -> BoxFuture<'_, Result<Vec<StationRecord>, SourceError>>;

    /// Latest records, with or without a position.
    fn latest_prices(&self) -> BoxFuture<'_, Result<Vec<StationRecord>, SourceError>>;
}

const LATEST_PRICES_SQL: &str = "
    SELECT p1.postcode, p1.suburb, p1.station, p1.address, p1.lat, p1.lng, p1.date, p1.price
    FROM petrol_prices p1
    INNER JOIN (
        SELECT postcode, suburb, station, address, MAX(date) AS max_date
        FROM petrol_prices
        GROUP BY postcode, suburb, station, address
    ) p2
    ON p1.postcode = p2.postcode
        AND p1.suburb = p2.suburb
        AND p1.station = p2.station
        AND p1.address IS p2.address
        AND p1.date = p2.max_date";

const LOCATED_FILTER_SQL: &str = "
    WHERE p1.lat IS NOT NULL AND p1.lng IS NOT NULL AND p1.lat != '' AND p1.lng != ''";

const ORDER_SQL: &str = "
    ORDER BY p1.postcode, p1.suburb, p1.station, p1.address";

/// Station source reading the `petrol_prices` table of a SQLite database.
///
/// Each call opens a read-only connection on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct SqliteStationSource {
    path: PathBuf,
}

impl SqliteStationSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn query(&self, located_only: bool) -> Result<Vec<StationRecord>, SourceError> {
        let path = self.path.clone();
        let records = tokio::task::spawn_blocking(move || read_latest(&path, located_only))
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))??;

        debug!(
            count = records.len(),
            located_only,
            path = %self.path.display(),
            "read latest station prices"
        );
        Ok(records)
    }
}

impl StationSource for SqliteStationSource {
    fn located_latest_prices(&self) -> BoxFuture<'_, Result<Vec<StationRecord>, SourceError>> {
        Box::pin(self.query(true))
    }

    fn latest_prices(&self) -> BoxFuture<'_, Result<Vec<StationRecord>, SourceError>> {
        Box::pin(self.query(false))
    }
}

fn read_latest(path: &Path, located_only: bool) -> Result<Vec<StationRecord>, SourceError> {
    if !path.exists() {
        return Err(SourceError::Unavailable(format!(
            "database not found at {}",
            path.display()
        )));
    }

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    let filter = if located_only { LOCATED_FILTER_SQL } else { "" };
    let sql = format!("{LATEST_PRICES_SQL}{filter}{ORDER_SQL}");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_record)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(SourceError::from)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<StationRecord> {
    Ok(StationRecord {
        postcode: text(row, 0)?.unwrap_or_default(),
        suburb: text(row, 1)?.unwrap_or_default(),
        station: text(row, 2)?.unwrap_or_default(),
        address: text(row, 3)?,
        lat: text(row, 4)?,
        lng: text(row, 5)?,
        date: text(row, 6)?.unwrap_or_default(),
        price: number(row, 7)?,
    })
}

/// Read a column as text whatever SQLite type affinity it ended up with.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get::<_, Value>(idx)? {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    })
}

fn number(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<f64>> {
    Ok(match row.get::<_, Value>(idx)? {
        Value::Integer(i) => Some(i as f64),
        Value::Real(f) => Some(f),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Null | Value::Blob(_) => None,
    })
}
