//! Core traits for the persistent tile store.
//!
//! The `TileStore` trait is the only capability the read path and the bulk
//! download path share. It is deliberately small: keyed lookups, keyed
//! inserts, and a wholesale clear. There is no per-tile or time-based
//! eviction; a store grows until it is cleared.
//!
//! # Example
//!
//! ```ignore
//! use fieldtile::store::{MemoryTileStore, StoredTile, TileStore};
//! use fieldtile::coord::TileKey;
//!
//! let store = MemoryTileStore::new();
//! let key = TileKey::new(13, 4093, 2723)?;
//! store.put(StoredTile::new(key, png_bytes)).await?;
//! let tile = store.get(&key).await?;
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::coord::TileKey;

/// A tile image persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTile {
    /// Which tile this is.
    pub key: TileKey,
    /// Raw image bytes exactly as served by the tile server.
    pub data: Vec<u8>,
    /// Unix time in milliseconds when the tile was fetched.
    pub fetched_at_millis: i64,
}

impl StoredTile {
    /// Create a stored tile stamped with the current time.
    pub fn new(key: TileKey, data: Vec<u8>) -> Self {
        Self {
            key,
            data,
            fetched_at_millis: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create a stored tile with an explicit fetch timestamp.
    pub fn with_timestamp(key: TileKey, data: Vec<u8>, fetched_at_millis: i64) -> Self {
        Self {
            key,
            data,
            fetched_at_millis,
        }
    }

    /// Size of the image payload in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Result of a clear-all operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearResult {
    /// Number of tiles removed.
    pub entries_removed: u64,
    /// Image bytes removed.
    pub bytes_freed: u64,
}

impl fmt::Display for ClearResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "removed {} tiles, freed {} bytes",
            self.entries_removed, self.bytes_freed
        )
    }
}

/// Point-in-time size of a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of stored tiles.
    pub entries: u64,
    /// Total image bytes.
    pub bytes: u64,
}

/// Errors that can occur while reading or writing the store.
///
/// Any of these means no further tiles can be saved, so the bulk download
/// path treats them as fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error in the backing storage (includes disk full).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be decoded.
    #[error("Corrupt tile record for {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// A record could not be encoded for storage.
    #[error("Failed to encode tile {key}: {reason}")]
    Encode { key: String, reason: String },

    /// Failed to run blocking storage work.
    #[error("Failed to spawn task: {0}")]
    SpawnError(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistent key-value storage for tiles.
///
/// Implementations are shared between the interactive read path and the
/// bulk download path as `Arc<dyn TileStore>`; both may call concurrently.
/// A read racing a write of the same key may observe either the old or the
/// new state.
///
/// # Dyn Compatibility
///
/// Async methods return [`BoxFuture`] so the trait can be used as a trait
/// object and swapped for a test double.
pub trait TileStore: Send + Sync {
    /// Look up a tile.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(tile))` if the tile is stored
    /// - `Ok(None)` if it is not
    /// - `Err(_)` if the store could not be read
    fn get(&self, key: &TileKey) -> BoxFuture<'_, Result<Option<StoredTile>, StoreError>>;

    /// Store a tile, replacing any previous copy under the same key.
    fn put(&self, tile: StoredTile) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Remove every tile. Clearing an empty store succeeds.
    fn clear(&self) -> BoxFuture<'_, Result<ClearResult, StoreError>>;

    /// Count stored tiles and bytes.
    fn stats(&self) -> BoxFuture<'_, Result<StoreStats, StoreError>>;
}
