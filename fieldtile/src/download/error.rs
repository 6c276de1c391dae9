//! Error types for bulk downloads.

use thiserror::Error;

use crate::coord::CoordError;
use crate::store::StoreError;

/// Errors that stop a bulk download.
///
/// Individual tile fetch failures are never reported here; they are counted
/// in the progress and the final report.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Bounds or zoom range cannot be enumerated.
    #[error("Invalid download request: {0}")]
    InvalidRequest(#[from] CoordError),

    /// The request covers more tiles than the configured limit.
    #[error("Request covers {requested} tiles, above the limit of {limit}")]
    TooManyTiles { requested: u64, limit: u64 },

    /// The store cannot be read or written, so no further tile can be saved.
    #[error("Tile store failure: {0}")]
    Store(#[from] StoreError),
}
