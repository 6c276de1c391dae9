//! FieldTile - offline map-tile cache
//!
//! Serves previously downloaded raster tiles from local storage, falls back
//! to the network otherwise, and prefetches a bounded tile pyramid for
//! offline use.
//!
//! - [`coord`]: Web Mercator tile math
//! - [`store`]: persistent tile storage and clear-all
//! - [`provider`]: tile fetching and the offline-first read path
//! - [`download`]: bulk prefetch with progress reporting
//! - [`app`]: composition root wiring the pieces together

pub mod app;
pub mod config;
pub mod coord;
pub mod download;
pub mod logging;
pub mod provider;
#[cfg(feature = "server")]
pub mod server;
pub mod store;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
