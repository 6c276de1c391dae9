//! Application bootstrap.
//!
//! [`FieldTileApp`] opens the tile store described by an [`AppConfig`] and
//! wires the offline provider and bulk downloader around it.
//!
//! ```text
//! FieldTileApp
//!   ├── Arc<dyn TileStore> ◄──────────┬───────────────┐
//!   ├── OfflineTileProvider (read)    │               │
//!   ├── BulkDownloader (prefetch) ────┘               │
//!   └── clear() ──────────────────────────────────────┘
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::FieldTileApp;
pub use config::{AppConfig, StoreBackend};
pub use error::AppError;
