use std::path::PathBuf;

/// Failure kinds for the scrape/store pipeline and the query service.
///
/// Every variant is caught at the component boundary where it occurs and
/// folded into an outcome value or an HTTP status; none of them are allowed
/// to take the process down.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("page is not parseable markup: {0}")]
    Parse(String),

    #[error("storage unavailable at {path}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("storage write failed: {0}")]
    StorageWrite(#[source] rusqlite::Error),

    #[error("storage read failed: {0}")]
    StorageRead(#[source] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
