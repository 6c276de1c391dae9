//! Remote tile access.
//!
//! - [`TileFetcher`]: validated, retried single-tile downloads for the bulk
//!   downloader
//! - [`OfflineTileProvider`]: cache-aside [`TileSource`] for the rendering
//!   layer
//!
//! Both talk to the network through [`AsyncHttpClient`] so tests can swap in
//! a mock.
//!
//! ```ignore
//! use fieldtile::provider::{AsyncReqwestClient, OfflineTileProvider, TileUrlTemplate};
//!
//! let client = Arc::new(AsyncReqwestClient::new()?);
//! let provider = OfflineTileProvider::new(store, client, TileUrlTemplate::default());
//! let image = provider.tile(&key).await;
//! ```

mod fetcher;
mod http;
mod offline;
mod template;
mod types;

pub use fetcher::{RetryPolicy, TileFetcher, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use offline::{OfflineTileProvider, TileImage, TileSource};
pub use template::{TileUrlTemplate, DEFAULT_SUBDOMAINS, DEFAULT_URL_TEMPLATE};
pub use types::{HttpResponse, ProviderError};

#[cfg(test)]
pub use http::tests::{png_bytes, png_response, MockAsyncHttpClient};
