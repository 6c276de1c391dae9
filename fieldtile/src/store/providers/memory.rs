//! In-memory tile store using moka.
//!
//! Wraps an unbounded `moka::future::Cache`. No capacity or TTL is set, so
//! nothing is ever evicted; this mirrors the persistent store's semantics
//! for tests and throwaway sessions.

use moka::future::Cache as MokaCache;

use crate::coord::TileKey;
use crate::store::traits::{BoxFuture, ClearResult, StoreError, StoreStats, StoredTile, TileStore};

/// Non-persistent tile store.
pub struct MemoryTileStore {
    cache: MokaCache<TileKey, StoredTile>,
}

impl MemoryTileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            cache: MokaCache::builder().build(),
        }
    }

    fn snapshot_stats(&self) -> StoreStats {
        self.cache
            .iter()
            .fold(StoreStats::default(), |mut stats, (_, tile)| {
                stats.entries += 1;
                stats.bytes += tile.size_bytes();
                stats
            })
    }
}

impl Default for MemoryTileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TileStore for MemoryTileStore {
    fn get(&self, key: &TileKey) -> BoxFuture<'_, Result<Option<StoredTile>, StoreError>> {
        let key = *key;
        Box::pin(async move { Ok(self.cache.get(&key).await) })
    }

    fn put(&self, tile: StoredTile) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            self.cache.insert(tile.key, tile).await;
            Ok(())
        })
    }

    fn clear(&self) -> BoxFuture<'_, Result<ClearResult, StoreError>> {
        Box::pin(async move {
            let before = self.snapshot_stats();
            self.cache.invalidate_all();
            self.cache.run_pending_tasks().await;

            Ok(ClearResult {
                entries_removed: before.entries,
                bytes_freed: before.bytes,
            })
        })
    }

    fn stats(&self) -> BoxFuture<'_, Result<StoreStats, StoreError>> {
        Box::pin(async move { Ok(self.snapshot_stats()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(x: u32) -> TileKey {
        TileKey { zoom: 13, x, y: 2723 }
    }

    #[tokio::test]
    async fn test_memory_store_put_and_get() {
        let store = MemoryTileStore::new();
        let tile = StoredTile::with_timestamp(key(1), vec![1, 2, 3], 42);

        store.put(tile.clone()).await.unwrap();

        assert_eq!(store.get(&key(1)).await.unwrap(), Some(tile));
    }

    #[tokio::test]
    async fn test_memory_store_get_missing() {
        let store = MemoryTileStore::new();
        assert!(store.get(&key(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_put_replaces() {
        let store = MemoryTileStore::new();

        store.put(StoredTile::new(key(1), vec![1])).await.unwrap();
        store.put(StoredTile::new(key(1), vec![2, 2])).await.unwrap();

        let tile = store.get(&key(1)).await.unwrap().unwrap();
        assert_eq!(tile.data, vec![2, 2]);
        assert_eq!(store.stats().await.unwrap().entries, 1);
    }

    #[tokio::test]
    async fn test_memory_store_stats() {
        let store = MemoryTileStore::new();
        store.put(StoredTile::new(key(1), vec![0u8; 100])).await.unwrap();
        store.put(StoredTile::new(key(2), vec![0u8; 250])).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.bytes, 350);
    }

    #[tokio::test]
    async fn test_memory_store_clear() {
        let store = MemoryTileStore::new();
        store.put(StoredTile::new(key(1), vec![0u8; 10])).await.unwrap();
        store.put(StoredTile::new(key(2), vec![0u8; 20])).await.unwrap();

        let result = store.clear().await.unwrap();
        assert_eq!(result.entries_removed, 2);
        assert_eq!(result.bytes_freed, 30);

        assert!(store.get(&key(1)).await.unwrap().is_none());
        assert!(store.get(&key(2)).await.unwrap().is_none());
        assert_eq!(store.stats().await.unwrap(), StoreStats::default());
    }

    #[tokio::test]
    async fn test_memory_store_clear_empty_is_noop() {
        let store = MemoryTileStore::new();
        let result = store.clear().await.unwrap();
        assert_eq!(result, ClearResult::default());
    }

    #[tokio::test]
    async fn test_memory_store_concurrent_access() {
        use std::sync::Arc;

        let store = Arc::new(MemoryTileStore::new());
        let mut handles = Vec::new();

        for i in 0..50u32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let tile = StoredTile::new(key(i), vec![i as u8; 16]);
                store.put(tile.clone()).await.unwrap();
                assert_eq!(store.get(&key(i)).await.unwrap(), Some(tile));
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.stats().await.unwrap().entries, 50);
    }
}
