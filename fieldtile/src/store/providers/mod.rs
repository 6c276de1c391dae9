//! Tile store implementations.
//!
//! # Available Providers
//!
//! - [`DiskTileStore`]: Persistent store, one bincode record per tile
//! - [`MemoryTileStore`]: Non-persistent store using moka, for tests and
//!   throwaway sessions

mod disk;
mod memory;

pub use disk::DiskTileStore;
pub use memory::MemoryTileStore;
