//! Persistent tile storage.
//!
//! Tiles are keyed by [`TileKey`](crate::coord::TileKey) and hold the raw
//! image bytes as served by the tile server. The store is shared by the
//! interactive read path and the bulk downloader; only the downloader and
//! [`clear_offline_tiles`] ever change it.

mod providers;
mod traits;

pub use providers::{DiskTileStore, MemoryTileStore};
pub use traits::{BoxFuture, ClearResult, StoreError, StoreStats, StoredTile, TileStore};

use tracing::{error, info};

/// Remove every stored tile.
///
/// Clearing an empty store succeeds with a zero result. A failure is logged
/// and returned; the caller decides whether to surface it.
pub async fn clear_offline_tiles(store: &dyn TileStore) -> Result<ClearResult, StoreError> {
    match store.clear().await {
        Ok(result) => {
            info!(
                entries = result.entries_removed,
                bytes = result.bytes_freed,
                "Offline tiles cleared"
            );
            Ok(result)
        }
        Err(e) => {
            error!(error = %e, "Failed to clear offline tiles");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileKey;

    fn broken() -> StoreError {
        StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "broken"))
    }

    struct BrokenStore;

    impl TileStore for BrokenStore {
        fn get(&self, _key: &TileKey) -> BoxFuture<'_, Result<Option<StoredTile>, StoreError>> {
            Box::pin(async { Err(broken()) })
        }

        fn put(&self, _tile: StoredTile) -> BoxFuture<'_, Result<(), StoreError>> {
            Box::pin(async { Err(broken()) })
        }

        fn clear(&self) -> BoxFuture<'_, Result<ClearResult, StoreError>> {
            Box::pin(async { Err(broken()) })
        }

        fn stats(&self) -> BoxFuture<'_, Result<StoreStats, StoreError>> {
            Box::pin(async { Err(broken()) })
        }
    }

    #[tokio::test]
    async fn test_clear_offline_tiles_empties_store() {
        let store = MemoryTileStore::new();
        for x in 0..3 {
            let key = TileKey::new(13, 4091 + x, 2719).unwrap();
            store.put(StoredTile::new(key, vec![0; 8])).await.unwrap();
        }

        let result = clear_offline_tiles(&store).await.unwrap();

        assert_eq!(result.entries_removed, 3);
        assert_eq!(store.stats().await.unwrap().entries, 0);
    }

    #[tokio::test]
    async fn test_clear_offline_tiles_on_empty_store() {
        let store = MemoryTileStore::new();
        let result = clear_offline_tiles(&store).await.unwrap();
        assert_eq!(result, ClearResult::default());
    }

    #[tokio::test]
    async fn test_clear_offline_tiles_reports_failure() {
        let result = clear_offline_tiles(&BrokenStore).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
