//! Bulk tile downloader.
//!
//! Walks every tile of a [`DownloadRequest`] in order, skipping tiles the
//! store already holds, fetching the rest and storing each success. Tile
//! failures are counted and the walk continues; a store failure ends it.
//!
//! # Concurrency
//!
//! Sequential by default. With a concurrency above one, up to that many
//! tiles are in flight at once, but results are consumed in enumeration
//! order so progress stays monotonic and each tile's store check still
//! happens before its fetch.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::error::DownloadError;
use super::progress::{DownloadPhase, DownloadProgress, DownloadReport, ProgressSink};
use super::request::DownloadRequest;
use crate::coord::TileKey;
use crate::provider::{AsyncHttpClient, TileFetcher};
use crate::store::{StoreError, StoredTile, TileStore};

/// Upper bound on tiles in flight.
pub const MAX_CONCURRENCY: usize = 8;

/// Default cap on tiles per request.
pub const DEFAULT_MAX_TILES: u64 = 25_000;

/// What happened to one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileOutcome {
    AlreadyCached,
    Downloaded,
    Failed,
}

/// Populates a [`TileStore`] for an area ahead of time.
pub struct BulkDownloader<C: AsyncHttpClient> {
    store: Arc<dyn TileStore>,
    fetcher: TileFetcher<C>,
    concurrency: usize,
    max_tiles: Option<u64>,
}

impl<C: AsyncHttpClient> BulkDownloader<C> {
    /// Sequential downloader with the default tile cap.
    pub fn new(store: Arc<dyn TileStore>, fetcher: TileFetcher<C>) -> Self {
        Self {
            store,
            fetcher,
            concurrency: 1,
            max_tiles: Some(DEFAULT_MAX_TILES),
        }
    }

    /// Set tiles in flight, clamped to `1..=MAX_CONCURRENCY`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Set the tile cap; `None` removes it.
    pub fn with_max_tiles(mut self, max_tiles: Option<u64>) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Download every tile of `request` that is not already stored.
    pub async fn download_tiles(
        &self,
        request: &DownloadRequest,
        sink: &dyn ProgressSink,
    ) -> Result<DownloadReport, DownloadError> {
        self.download_with_cancel(request, sink, &CancellationToken::new())
            .await
    }

    /// Like [`download_tiles`](Self::download_tiles), stopping early once
    /// `cancel` fires.
    ///
    /// Tiles already stored stay stored. A cancelled run ends with a
    /// [`DownloadPhase::Cancelled`] snapshot and `cancelled` set in the
    /// report.
    pub async fn download_with_cancel(
        &self,
        request: &DownloadRequest,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<DownloadReport, DownloadError> {
        let started = Instant::now();

        let total = request.tile_count()?;
        if let Some(limit) = self.max_tiles {
            if total > limit {
                return Err(DownloadError::TooManyTiles {
                    requested: total,
                    limit,
                });
            }
        }

        info!(
            bounds = %request.bounds,
            min_zoom = request.min_zoom,
            max_zoom = request.max_zoom,
            total,
            concurrency = self.concurrency,
            "Starting bulk tile download"
        );

        let mut progress = DownloadProgress {
            total_tiles: total,
            completed_tiles: 0,
            failed_tiles: 0,
            phase: DownloadPhase::Enumerating,
        };
        sink.report(&progress);
        progress.phase = DownloadPhase::Downloading;

        let mut already_cached = 0u64;
        let mut downloaded = 0u64;
        let mut cancelled = false;

        let mut outcomes = stream::iter(request.tiles()?)
            .map(|key| self.process_tile(key))
            .buffered(self.concurrency);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = outcomes.next() => next,
            };

            let Some(outcome) = next else {
                break;
            };

            match outcome {
                Ok(TileOutcome::AlreadyCached) => {
                    already_cached += 1;
                    progress.completed_tiles += 1;
                }
                Ok(TileOutcome::Downloaded) => {
                    downloaded += 1;
                    progress.completed_tiles += 1;
                }
                Ok(TileOutcome::Failed) => {
                    progress.failed_tiles += 1;
                }
                Err(e) => {
                    error!(
                        error = %e,
                        completed = progress.completed_tiles,
                        failed = progress.failed_tiles,
                        total,
                        "Bulk download stopped by tile store failure"
                    );
                    return Err(DownloadError::Store(e));
                }
            }
            sink.report(&progress);
        }

        progress.phase = if cancelled {
            DownloadPhase::Cancelled
        } else {
            DownloadPhase::Done
        };
        sink.report(&progress);

        let report = DownloadReport {
            total,
            completed: progress.completed_tiles,
            failed: progress.failed_tiles,
            already_cached,
            downloaded,
            cancelled,
            elapsed: started.elapsed(),
        };

        info!(
            total = report.total,
            downloaded = report.downloaded,
            already_cached = report.already_cached,
            failed = report.failed,
            cancelled = report.cancelled,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Bulk tile download finished"
        );

        Ok(report)
    }

    async fn process_tile(&self, key: TileKey) -> Result<TileOutcome, StoreError> {
        // A record that no longer decodes is fetched again and overwritten.
        match self.store.get(&key).await {
            Ok(Some(_)) => {
                debug!(key = %key, "Tile already stored, skipping");
                return Ok(TileOutcome::AlreadyCached);
            }
            Ok(None) => {}
            Err(StoreError::Corrupt { reason, .. }) => {
                warn!(key = %key, reason = %reason, "Stored tile is corrupt, fetching again");
            }
            Err(e) => return Err(e),
        }

        match self.fetcher.fetch_tile(&key).await {
            Some(data) => {
                self.store.put(StoredTile::new(key, data)).await?;
                Ok(TileOutcome::Downloaded)
            }
            None => Ok(TileOutcome::Failed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::coord::{CoordError, GeoBounds};
    use crate::download::NoProgress;
    use crate::provider::{MockAsyncHttpClient, RetryPolicy, TileUrlTemplate};
    use crate::store::{BoxFuture, ClearResult, MemoryTileStore, StoreStats};

    fn london() -> GeoBounds {
        GeoBounds::new(51.51, 51.50, -0.09, -0.10)
    }

    fn downloader(
        store: Arc<dyn TileStore>,
        client: MockAsyncHttpClient,
    ) -> (Arc<MockAsyncHttpClient>, BulkDownloader<MockAsyncHttpClient>) {
        let client = Arc::new(client);
        let fetcher = TileFetcher::new(Arc::clone(&client), TileUrlTemplate::default())
            .with_retry_policy(RetryPolicy::none());
        (client, BulkDownloader::new(store, fetcher))
    }

    /// Collects every snapshot it is given.
    #[derive(Default)]
    struct Recorder(Mutex<Vec<DownloadProgress>>);

    impl ProgressSink for Recorder {
        fn report(&self, progress: &DownloadProgress) {
            self.0.lock().unwrap().push(*progress);
        }
    }

    impl Recorder {
        fn snapshots(&self) -> Vec<DownloadProgress> {
            self.0.lock().unwrap().clone()
        }
    }

    /// Store whose every record fails to decode but accepts writes.
    #[derive(Default)]
    struct CorruptStore {
        writes: AtomicUsize,
    }

    impl TileStore for CorruptStore {
        fn get(&self, key: &TileKey) -> BoxFuture<'_, Result<Option<StoredTile>, StoreError>> {
            let key = key.to_string();
            Box::pin(async move {
                Err(StoreError::Corrupt {
                    key,
                    reason: "unexpected end of record".into(),
                })
            })
        }

        fn put(&self, _tile: StoredTile) -> BoxFuture<'_, Result<(), StoreError>> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        }

        fn clear(&self) -> BoxFuture<'_, Result<ClearResult, StoreError>> {
            Box::pin(async { Ok(ClearResult::default()) })
        }

        fn stats(&self) -> BoxFuture<'_, Result<StoreStats, StoreError>> {
            Box::pin(async { Ok(StoreStats::default()) })
        }
    }

    /// Store that reads fine but refuses every write, like a full disk.
    struct FullStore;

    impl TileStore for FullStore {
        fn get(&self, _key: &TileKey) -> BoxFuture<'_, Result<Option<StoredTile>, StoreError>> {
            Box::pin(async { Ok(None) })
        }

        fn put(&self, _tile: StoredTile) -> BoxFuture<'_, Result<(), StoreError>> {
            Box::pin(async {
                Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "quota exceeded",
                )))
            })
        }

        fn clear(&self) -> BoxFuture<'_, Result<ClearResult, StoreError>> {
            Box::pin(async { Ok(ClearResult::default()) })
        }

        fn stats(&self) -> BoxFuture<'_, Result<StoreStats, StoreError>> {
            Box::pin(async { Ok(StoreStats::default()) })
        }
    }

    #[tokio::test]
    async fn test_london_single_zoom_stores_both_tiles() {
        let store = Arc::new(MemoryTileStore::new());
        let (client, downloader) = downloader(store.clone(), MockAsyncHttpClient::serving_png());
        let recorder = Recorder::default();

        let report = downloader
            .download_tiles(&DownloadRequest::new(london(), 13, 13), &recorder)
            .await
            .unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.downloaded, 2);
        assert!(report.is_complete());
        assert_eq!(client.call_count(), 2);
        for y in [2723, 2724] {
            let key = TileKey::new(13, 4093, y).unwrap();
            assert!(store.get(&key).await.unwrap().is_some());
        }

        let phases: Vec<_> = recorder.snapshots().iter().map(|p| p.phase).collect();
        assert_eq!(
            phases,
            vec![
                DownloadPhase::Enumerating,
                DownloadPhase::Downloading,
                DownloadPhase::Downloading,
                DownloadPhase::Done,
            ]
        );
        assert_eq!(
            recorder.snapshots().last().unwrap().to_string(),
            "Download complete. 2 tiles saved."
        );
    }

    #[tokio::test]
    async fn test_second_run_fetches_nothing() {
        let store = Arc::new(MemoryTileStore::new());
        let (client, downloader) = downloader(store, MockAsyncHttpClient::serving_png());
        let request = DownloadRequest::with_default_zooms(london());

        let first = downloader.download_tiles(&request, &NoProgress).await.unwrap();
        assert_eq!(first.downloaded, 22);
        assert_eq!(client.call_count(), 22);

        let second = downloader.download_tiles(&request, &NoProgress).await.unwrap();
        assert_eq!(client.call_count(), 22);
        assert_eq!(second.completed, second.total);
        assert_eq!(second.already_cached, 22);
        assert_eq!(second.downloaded, 0);
    }

    #[tokio::test]
    async fn test_cached_tile_is_not_fetched() {
        let store = Arc::new(MemoryTileStore::new());
        store
            .put(StoredTile::new(TileKey::new(13, 4093, 2723).unwrap(), vec![1]))
            .await
            .unwrap();
        let (client, downloader) = downloader(store, MockAsyncHttpClient::serving_png());

        let report = downloader
            .download_tiles(&DownloadRequest::new(london(), 13, 13), &NoProgress)
            .await
            .unwrap();

        assert_eq!(client.call_count(), 1);
        assert!(client.requested_urls()[0].ends_with("/13/4093/2724.png"));
        assert_eq!(report.already_cached, 1);
        assert_eq!(report.completed, 2);
    }

    #[tokio::test]
    async fn test_partial_failure_is_counted_and_retry_fills_gap() {
        let store = Arc::new(MemoryTileStore::new());
        let (_, failing) = downloader(
            store.clone(),
            MockAsyncHttpClient::serving_png().failing_for("/14/"),
        );
        let request = DownloadRequest::with_default_zooms(london());

        let report = failing.download_tiles(&request, &NoProgress).await.unwrap();

        assert_eq!(report.failed, 2);
        assert_eq!(report.completed, 20);
        assert_eq!(report.completed + report.failed, report.total);
        assert!(!report.is_complete());
        assert_eq!(store.stats().await.unwrap().entries, 20);

        let (client, healthy) = downloader(store.clone(), MockAsyncHttpClient::serving_png());
        let retry = healthy.download_tiles(&request, &NoProgress).await.unwrap();

        assert_eq!(client.call_count(), 2);
        assert_eq!(retry.downloaded, 2);
        assert_eq!(retry.already_cached, 20);
        assert!(retry.is_complete());
    }

    #[tokio::test]
    async fn test_store_failure_is_fatal() {
        let (client, downloader) =
            downloader(Arc::new(FullStore), MockAsyncHttpClient::serving_png());
        let recorder = Recorder::default();

        let result = downloader
            .download_tiles(&DownloadRequest::with_default_zooms(london()), &recorder)
            .await;

        assert!(matches!(result, Err(DownloadError::Store(_))));
        assert_eq!(client.call_count(), 1);
        assert!(recorder
            .snapshots()
            .iter()
            .all(|p| p.phase != DownloadPhase::Done));
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_with_concurrency() {
        let store = Arc::new(MemoryTileStore::new());
        let (client, downloader) = downloader(
            store,
            MockAsyncHttpClient::serving_png().failing_for("/15/16374/"),
        );
        let downloader = downloader.with_concurrency(4);
        let recorder = Recorder::default();

        let report = downloader
            .download_tiles(&DownloadRequest::with_default_zooms(london()), &recorder)
            .await
            .unwrap();

        assert_eq!(client.call_count(), 22);
        assert_eq!(report.failed, 3);

        let snapshots = recorder.snapshots();
        assert_eq!(snapshots.len(), 22 + 2);
        for pair in snapshots.windows(2) {
            assert!(pair[1].processed_tiles() >= pair[0].processed_tiles());
            assert!(pair[1].completed_tiles >= pair[0].completed_tiles);
            assert!(pair[1].failed_tiles >= pair[0].failed_tiles);
        }
        let last = snapshots.last().unwrap();
        assert_eq!(last.phase, DownloadPhase::Done);
        assert_eq!(last.processed_tiles(), last.total_tiles);
    }

    #[tokio::test]
    async fn test_outcomes_follow_enumeration_order_with_concurrency() {
        let store = Arc::new(MemoryTileStore::new());
        let request = DownloadRequest::with_default_zooms(london());
        let tiles: Vec<TileKey> = request.tiles().unwrap().collect();
        let seeded: Vec<TileKey> = tiles
            .iter()
            .copied()
            .filter(|k| k.zoom == 13 || (k.zoom == 16 && k.y == tiles[tiles.len() - 1].y))
            .collect();
        for key in &seeded {
            store.put(StoredTile::new(*key, vec![1])).await.unwrap();
        }

        let (client, downloader) = downloader(
            store,
            MockAsyncHttpClient::serving_png().failing_for("/15/16374/"),
        );
        let downloader = downloader.with_concurrency(4);
        let recorder = Recorder::default();

        let report = downloader.download_tiles(&request, &recorder).await.unwrap();

        assert_eq!(report.already_cached, seeded.len() as u64);
        assert_eq!(report.failed, 3);
        assert_eq!(client.call_count(), tiles.len() - seeded.len());

        let urls = client.requested_urls();
        for key in &seeded {
            let suffix = format!("/{}/{}/{}.png", key.zoom, key.x, key.y);
            assert!(!urls.iter().any(|u| u.ends_with(&suffix)), "{} fetched", suffix);
        }

        // One snapshot per tile, in enumeration order, between the first and last.
        let snapshots = recorder.snapshots();
        assert_eq!(snapshots.len(), tiles.len() + 2);
        let per_tile = &snapshots[1..snapshots.len() - 1];
        let mut previous = snapshots[0];
        for (key, snapshot) in tiles.iter().zip(per_tile) {
            let expect_failure = key.zoom == 15 && key.x == 16374;
            assert_eq!(
                snapshot.failed_tiles - previous.failed_tiles,
                u64::from(expect_failure),
                "outcome for {} reported out of order",
                key
            );
            assert_eq!(
                snapshot.completed_tiles - previous.completed_tiles,
                u64::from(!expect_failure)
            );
            previous = *snapshot;
        }
    }

    #[tokio::test]
    async fn test_corrupt_record_is_fetched_again() {
        let store = Arc::new(CorruptStore::default());
        let (client, downloader) = downloader(store.clone(), MockAsyncHttpClient::serving_png());
        let request = DownloadRequest::new(london(), 13, 13);

        let report = downloader.download_tiles(&request, &NoProgress).await.unwrap();

        assert_eq!(client.call_count(), 2);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.already_cached, 0);
        assert!(report.is_complete());
        assert_eq!(store.writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_fetches_nothing() {
        let store = Arc::new(MemoryTileStore::new());
        let (client, downloader) = downloader(store, MockAsyncHttpClient::serving_png());
        let recorder = Recorder::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = downloader
            .download_with_cancel(
                &DownloadRequest::with_default_zooms(london()),
                &recorder,
                &cancel,
            )
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.completed, 0);
        assert_eq!(client.call_count(), 0);
        assert_eq!(
            recorder.snapshots().last().unwrap().phase,
            DownloadPhase::Cancelled
        );
    }

    #[tokio::test]
    async fn test_cancel_from_progress_sink_stops_between_tiles() {
        let store = Arc::new(MemoryTileStore::new());
        let (client, downloader) = downloader(store, MockAsyncHttpClient::serving_png());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let sink = move |p: &DownloadProgress| {
            if p.completed_tiles == 3 {
                trigger.cancel();
            }
        };

        let report = downloader
            .download_with_cancel(&DownloadRequest::with_default_zooms(london()), &sink, &cancel)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.completed, 3);
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_too_many_tiles_rejected_before_fetching() {
        let store = Arc::new(MemoryTileStore::new());
        let (client, downloader) = downloader(store, MockAsyncHttpClient::serving_png());
        let downloader = downloader.with_max_tiles(Some(10));

        let result = downloader
            .download_tiles(&DownloadRequest::with_default_zooms(london()), &NoProgress)
            .await;

        assert!(matches!(
            result,
            Err(DownloadError::TooManyTiles {
                requested: 22,
                limit: 10
            })
        ));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let store = Arc::new(MemoryTileStore::new());
        let (_, downloader) = downloader(store, MockAsyncHttpClient::serving_png());

        let result = downloader
            .download_tiles(&DownloadRequest::new(london(), 16, 13), &NoProgress)
            .await;

        assert!(matches!(
            result,
            Err(DownloadError::InvalidRequest(CoordError::InvalidZoomRange { .. }))
        ));
    }

    #[test]
    fn test_concurrency_is_clamped() {
        let store: Arc<dyn TileStore> = Arc::new(MemoryTileStore::new());
        let (_, d) = downloader(Arc::clone(&store), MockAsyncHttpClient::serving_png());
        assert_eq!(d.with_concurrency(0).concurrency(), 1);
        let (_, d) = downloader(store, MockAsyncHttpClient::serving_png());
        assert_eq!(d.with_concurrency(64).concurrency(), MAX_CONCURRENCY);
    }
}
