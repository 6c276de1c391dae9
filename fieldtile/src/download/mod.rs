//! Bulk prefetch of a tile pyramid for offline use.
//!
//! - Request validation and tile enumeration (`request`)
//! - Progress snapshots, sinks and the final report (`progress`)
//! - The download loop itself (`downloader`)
//!
//! # Example
//!
//! ```ignore
//! use fieldtile::coord::GeoBounds;
//! use fieldtile::download::{BulkDownloader, DownloadRequest};
//!
//! let request = DownloadRequest::with_default_zooms(GeoBounds::new(51.51, 51.50, -0.09, -0.10));
//! let report = downloader
//!     .download_tiles(&request, &|p: &DownloadProgress| println!("{}", p))
//!     .await?;
//! ```

mod downloader;
mod error;
mod progress;
mod request;

pub use downloader::{BulkDownloader, DEFAULT_MAX_TILES, MAX_CONCURRENCY};
pub use error::DownloadError;
pub use progress::{DownloadPhase, DownloadProgress, DownloadReport, NoProgress, ProgressSink};
pub use request::{DownloadRequest, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
