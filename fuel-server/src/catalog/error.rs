//! Station source error types.

/// Errors from the backing store that holds station prices.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Query or connection failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Store could not be reached at all (worker died, file missing, ...)
    #[error("station source unavailable: {0}")]
    Unavailable(String),
}
