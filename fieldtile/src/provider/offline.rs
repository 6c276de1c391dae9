//! Cache-aside tile source for the map-rendering layer.
//!
//! Serves tiles from the store when present and falls back to a single
//! direct GET of the live URL otherwise. The read path never writes to the
//! store and never returns an error: store failures degrade to a miss and
//! network failures come back as [`TileImage::Unavailable`].

use std::sync::Arc;

use tracing::{debug, warn};

use super::http::AsyncHttpClient;
use super::template::TileUrlTemplate;
use crate::coord::TileKey;
use crate::store::{BoxFuture, TileStore};

/// Outcome of a tile request from the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileImage {
    /// Served from the local store; no network traffic.
    Cached(Vec<u8>),
    /// Fetched live from the tile server.
    Live(Vec<u8>),
    /// Not stored and the live request failed. The renderer decides whether
    /// to show a placeholder.
    Unavailable { url: String, reason: String },
}

impl TileImage {
    /// Image bytes, if any.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            TileImage::Cached(data) | TileImage::Live(data) => Some(data),
            TileImage::Unavailable { .. } => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            TileImage::Cached(data) | TileImage::Live(data) => Some(data),
            TileImage::Unavailable { .. } => None,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, TileImage::Cached(_))
    }
}

/// Seam between the tile cache and whatever draws the map.
///
/// Called on every pan and zoom for each visible tile.
pub trait TileSource: Send + Sync {
    fn load_tile(&self, zoom: u8, x: u32, y: u32) -> BoxFuture<'_, TileImage>;
}

/// Offline-first tile provider.
pub struct OfflineTileProvider<C: AsyncHttpClient> {
    store: Arc<dyn TileStore>,
    client: Arc<C>,
    template: TileUrlTemplate,
}

impl<C: AsyncHttpClient> OfflineTileProvider<C> {
    pub fn new(store: Arc<dyn TileStore>, client: Arc<C>, template: TileUrlTemplate) -> Self {
        Self {
            store,
            client,
            template,
        }
    }

    /// Live URL for a tile, with a random subdomain.
    pub fn online_url(&self, key: &TileKey) -> String {
        self.template.url_for(key)
    }

    /// Resolve a tile: store first, then one network request.
    pub async fn tile(&self, key: &TileKey) -> TileImage {
        match self.store.get(key).await {
            Ok(Some(tile)) => {
                debug!(key = %key, bytes = tile.data.len(), "Tile served from store");
                return TileImage::Cached(tile.data);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(key = %key, error = %e, "Tile store read failed, treating as miss");
            }
        }

        let url = self.online_url(key);
        match self.client.get(&url).await {
            Ok(response) => {
                debug!(key = %key, bytes = response.body.len(), "Tile served from network");
                TileImage::Live(response.body)
            }
            Err(e) => {
                debug!(key = %key, url = %url, error = %e, "Live tile request failed");
                TileImage::Unavailable {
                    url,
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl<C: AsyncHttpClient> TileSource for OfflineTileProvider<C> {
    fn load_tile(&self, zoom: u8, x: u32, y: u32) -> BoxFuture<'_, TileImage> {
        Box::pin(async move {
            match TileKey::new(zoom, x, y) {
                Ok(key) => self.tile(&key).await,
                Err(e) => TileImage::Unavailable {
                    url: self.template.url_for_parts(zoom, x, y),
                    reason: e.to_string(),
                },
            }
        })
    }
}
