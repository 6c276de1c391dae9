//! On-disk tile store.
//!
//! Each tile is one file holding a bincode-encoded record of the fetch
//! timestamp and the raw image bytes.
//!
//! # File Layout
//!
//! ```text
//! {root}/{zoom}/{zoom}-{x}-{y}.tile
//! ```
//!
//! Partitioning by zoom keeps directories at a manageable size; the filename
//! is the tile's storage key so a directory listing is directly readable.
//! Writes go to a temporary sibling first and are renamed into place, so a
//! reader never observes a half-written tile.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::coord::TileKey;
use crate::store::traits::{BoxFuture, ClearResult, StoreError, StoreStats, StoredTile, TileStore};

/// Extension of committed tile files.
const TILE_EXTENSION: &str = "tile";

/// Extension of in-flight writes.
const TEMP_EXTENSION: &str = "tmp";

/// Current on-disk record version.
const RECORD_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct TileRecord {
    version: u8,
    fetched_at_millis: i64,
    data: Vec<u8>,
}

/// Persistent tile store rooted at a directory.
#[derive(Debug, Clone)]
pub struct DiskTileStore {
    root: PathBuf,
}

impl DiskTileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        info!(dir = %root.display(), "Disk tile store opened");
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn tile_path(&self, key: &TileKey) -> PathBuf {
        self.root
            .join(key.zoom.to_string())
            .join(format!("{}.{}", key, TILE_EXTENSION))
    }

    fn encode(tile: &StoredTile) -> Result<Vec<u8>, StoreError> {
        let record = TileRecord {
            version: RECORD_VERSION,
            fetched_at_millis: tile.fetched_at_millis,
            data: tile.data.clone(),
        };
        bincode::serialize(&record).map_err(|e| StoreError::Encode {
            key: tile.key.to_string(),
            reason: e.to_string(),
        })
    }

    fn decode(key: TileKey, bytes: &[u8]) -> Result<StoredTile, StoreError> {
        let record: TileRecord =
            bincode::deserialize(bytes).map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        if record.version != RECORD_VERSION {
            return Err(StoreError::Corrupt {
                key: key.to_string(),
                reason: format!("unsupported record version {}", record.version),
            });
        }

        Ok(StoredTile::with_timestamp(
            key,
            record.data,
            record.fetched_at_millis,
        ))
    }

    /// Walk the store and return every file this store owns with its size.
    ///
    /// Leftover temporary files are included so a clear also sweeps them.
    fn collect_files(root: &Path) -> io::Result<Vec<(PathBuf, u64, bool)>> {
        let mut files = Vec::new();

        let zoom_dirs = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e),
        };

        for zoom_dir in zoom_dirs {
            let zoom_dir = zoom_dir?;
            if !zoom_dir.file_type()?.is_dir() {
                continue;
            }

            for entry in std::fs::read_dir(zoom_dir.path())? {
                let entry = entry?;
                let path = entry.path();
                let is_tile = match path.extension().and_then(|e| e.to_str()) {
                    Some(TILE_EXTENSION) => true,
                    Some(TEMP_EXTENSION) => false,
                    _ => continue,
                };
                let size = entry.metadata()?.len();
                files.push((path, size, is_tile));
            }
        }

        Ok(files)
    }

    fn clear_blocking(root: &Path) -> io::Result<ClearResult> {
        let mut result = ClearResult::default();

        for (path, size, is_tile) in Self::collect_files(root)? {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            }
            if is_tile {
                result.entries_removed += 1;
                result.bytes_freed += size;
            }
        }

        // Drop zoom directories that are now empty; anything else is left alone.
        if let Ok(entries) = std::fs::read_dir(root) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    let _ = std::fs::remove_dir(&path);
                }
            }
        }

        Ok(result)
    }
}

impl TileStore for DiskTileStore {
    fn get(&self, key: &TileKey) -> BoxFuture<'_, Result<Option<StoredTile>, StoreError>> {
        let key = *key;
        Box::pin(async move {
            let path = self.tile_path(&key);
            match tokio::fs::read(&path).await {
                Ok(bytes) => Self::decode(key, &bytes).map(Some),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StoreError::Io(e)),
            }
        })
    }

    fn put(&self, tile: StoredTile) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let path = self.tile_path(&tile.key);
            let encoded = Self::encode(&tile)?;

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let temp_path = path.with_extension(format!(
                "{:08x}.{}",
                rand::random::<u32>(),
                TEMP_EXTENSION
            ));
            if let Err(e) = tokio::fs::write(&temp_path, &encoded).await {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(StoreError::Io(e));
            }
            if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(StoreError::Io(e));
            }

            debug!(key = %tile.key, bytes = tile.data.len(), "Tile written to disk store");
            Ok(())
        })
    }

    fn clear(&self) -> BoxFuture<'_, Result<ClearResult, StoreError>> {
        Box::pin(async move {
            let root = self.root.clone();
            let result = tokio::task::spawn_blocking(move || Self::clear_blocking(&root))
                .await
                .map_err(|e| StoreError::SpawnError(e.to_string()))??;

            if result.entries_removed > 0 {
                info!(
                    dir = %self.root.display(),
                    entries = result.entries_removed,
                    bytes = result.bytes_freed,
                    "Disk tile store cleared"
                );
            }
            Ok(result)
        })
    }

    fn stats(&self) -> BoxFuture<'_, Result<StoreStats, StoreError>> {
        Box::pin(async move {
            let root = self.root.clone();
            let files = tokio::task::spawn_blocking(move || Self::collect_files(&root))
                .await
                .map_err(|e| StoreError::SpawnError(e.to_string()))?
                .map_err(|e| {
                    warn!(error = %e, "Failed to scan disk tile store");
                    StoreError::Io(e)
                })?;

            Ok(files
                .iter()
                .filter(|(_, _, is_tile)| *is_tile)
                .fold(StoreStats::default(), |mut stats, (_, size, _)| {
                    stats.entries += 1;
                    stats.bytes += size;
                    stats
                }))
        })
    }
}
