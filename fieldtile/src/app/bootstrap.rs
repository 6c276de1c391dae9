//! Application bootstrap implementation.
//!
//! `FieldTileApp` is the composition root: it opens the store once and hands
//! the same `Arc<dyn TileStore>` to the read path, the bulk downloader and
//! the clear operation.

use std::sync::Arc;

use tracing::info;

use super::config::{AppConfig, StoreBackend};
use super::error::AppError;
use crate::download::BulkDownloader;
use crate::provider::{AsyncHttpClient, AsyncReqwestClient, OfflineTileProvider, TileFetcher};
use crate::store::{
    clear_offline_tiles, ClearResult, DiskTileStore, MemoryTileStore, StoreError, StoreStats,
    TileStore,
};

/// FieldTile application with its shared store and network client.
///
/// # Example
///
/// ```ignore
/// use fieldtile::app::{AppConfig, FieldTileApp};
///
/// let app = FieldTileApp::start(AppConfig::from_config_file(&file)?).await?;
/// let image = app.provider().tile(&key).await;
/// let report = app.downloader().download_tiles(&request, &NoProgress).await?;
/// ```
pub struct FieldTileApp<C: AsyncHttpClient = AsyncReqwestClient> {
    config: AppConfig,
    store: Arc<dyn TileStore>,
    client: Arc<C>,
    provider: Arc<OfflineTileProvider<C>>,
}

impl FieldTileApp<AsyncReqwestClient> {
    /// Start the application with a real HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the HTTP client
    /// cannot be built.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        let client = AsyncReqwestClient::with_config(config.timeout_secs, &config.user_agent)?;
        Self::start_with_client(config, Arc::new(client)).await
    }
}

impl<C: AsyncHttpClient> FieldTileApp<C> {
    /// Start the application with a caller-supplied HTTP client.
    pub async fn start_with_client(config: AppConfig, client: Arc<C>) -> Result<Self, AppError> {
        let store: Arc<dyn TileStore> = match &config.store {
            StoreBackend::Disk(dir) => Arc::new(DiskTileStore::open(dir.clone()).await?),
            StoreBackend::Memory => Arc::new(MemoryTileStore::new()),
        };

        let provider = Arc::new(OfflineTileProvider::new(
            Arc::clone(&store),
            Arc::clone(&client),
            config.template.clone(),
        ));

        info!(
            store = ?config.store,
            template = config.template.template(),
            subdomains = config.template.subdomains().len(),
            "FieldTile started"
        );

        Ok(Self {
            config,
            store,
            client,
            provider,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The shared tile store.
    pub fn store(&self) -> Arc<dyn TileStore> {
        Arc::clone(&self.store)
    }

    /// The offline-first read path.
    pub fn provider(&self) -> Arc<OfflineTileProvider<C>> {
        Arc::clone(&self.provider)
    }

    /// A bulk downloader configured from the app settings.
    pub fn downloader(&self) -> BulkDownloader<C> {
        let fetcher = TileFetcher::new(Arc::clone(&self.client), self.config.template.clone())
            .with_retry_policy(self.config.retry);

        BulkDownloader::new(Arc::clone(&self.store), fetcher)
            .with_concurrency(self.config.concurrency)
            .with_max_tiles(self.config.max_tiles)
    }

    /// Remove every stored tile.
    pub async fn clear(&self) -> Result<ClearResult, StoreError> {
        clear_offline_tiles(self.store.as_ref()).await
    }

    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        self.store.stats().await
    }
}
