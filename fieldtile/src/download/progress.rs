//! Progress reporting for bulk downloads.
//!
//! The downloader pushes a [`DownloadProgress`] snapshot to a
//! [`ProgressSink`] once after enumeration, once after every tile, and once
//! at the end. Snapshots are never persisted.

use std::fmt;
use std::time::Duration;

/// Stage of a bulk download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    /// Tiles counted; nothing fetched yet.
    Enumerating,
    /// Working through the tile list.
    Downloading,
    /// Every tile has been attempted.
    Done,
    /// Stopped early on request.
    Cancelled,
}

impl fmt::Display for DownloadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadPhase::Enumerating => write!(f, "enumerating"),
            DownloadPhase::Downloading => write!(f, "downloading"),
            DownloadPhase::Done => write!(f, "done"),
            DownloadPhase::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Snapshot of a bulk download.
///
/// `completed_tiles` counts tiles that are now in the store, whether they
/// were fetched in this run or were already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub total_tiles: u64,
    pub completed_tiles: u64,
    pub failed_tiles: u64,
    pub phase: DownloadPhase,
}

impl DownloadProgress {
    /// Tiles attempted so far.
    pub fn processed_tiles(&self) -> u64 {
        self.completed_tiles + self.failed_tiles
    }
}

impl fmt::Display for DownloadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            DownloadPhase::Enumerating => {
                write!(f, "Found {} tiles to download...", self.total_tiles)
            }
            DownloadPhase::Downloading => write!(
                f,
                "Downloading... {}/{} (Failed: {})",
                self.completed_tiles, self.total_tiles, self.failed_tiles
            ),
            DownloadPhase::Done => {
                write!(f, "Download complete. {} tiles saved.", self.completed_tiles)
            }
            DownloadPhase::Cancelled => write!(
                f,
                "Download cancelled. {} of {} tiles saved.",
                self.completed_tiles, self.total_tiles
            ),
        }
    }
}

/// Receiver of progress snapshots.
///
/// Implemented for any `Fn(&DownloadProgress) + Send + Sync`, so a closure
/// can be passed directly.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: &DownloadProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(&DownloadProgress) + Send + Sync,
{
    fn report(&self, progress: &DownloadProgress) {
        self(progress)
    }
}

/// Sink that discards every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: &DownloadProgress) {}
}

/// Summary of a finished (or cancelled) bulk download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Tiles covered by the request.
    pub total: u64,
    /// Tiles now in the store (`downloaded + already_cached`).
    pub completed: u64,
    /// Tiles whose fetch failed.
    pub failed: u64,
    /// Tiles skipped because they were already stored.
    pub already_cached: u64,
    /// Tiles fetched and stored in this run.
    pub downloaded: u64,
    /// True if the run stopped before attempting every tile.
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl DownloadReport {
    /// True if every tile is now stored.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.completed == self.total
    }
}
