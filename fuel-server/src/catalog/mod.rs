//! Station price catalog.
//!
//! Holds an in-memory snapshot of the latest located price per station,
//! read from the backing store on first use and replaced only by an
//! explicit refresh.

mod error;
mod snapshot;
mod source;

pub use error::SourceError;
pub use snapshot::{CatalogSnapshot, StationCatalog};
pub use source::{SqliteStationSource, StationSource};

#[cfg(test)]
pub(crate) use source::tests::fixture_db;
