//! Default configuration values and standard paths.

use std::path::PathBuf;

use crate::download::{DEFAULT_MAX_TILES, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, MAX_CONCURRENCY};
use crate::provider::{
    DEFAULT_MAX_RETRIES, DEFAULT_SUBDOMAINS, DEFAULT_TIMEOUT_SECS, DEFAULT_URL_TEMPLATE,
    DEFAULT_USER_AGENT,
};

pub const DEFAULT_TILE_URL_TEMPLATE: &str = DEFAULT_URL_TEMPLATE;
pub const DEFAULT_TILE_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT_SECS;
pub const DEFAULT_TILE_MAX_RETRIES: u32 = DEFAULT_MAX_RETRIES;
pub const DEFAULT_TILE_USER_AGENT: &str = DEFAULT_USER_AGENT;

pub const DEFAULT_DOWNLOAD_MIN_ZOOM: u8 = DEFAULT_MIN_ZOOM;
pub const DEFAULT_DOWNLOAD_MAX_ZOOM: u8 = DEFAULT_MAX_ZOOM;
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 1;
pub const MAX_DOWNLOAD_CONCURRENCY: usize = MAX_CONCURRENCY;
pub const DEFAULT_DOWNLOAD_MAX_TILES: u64 = DEFAULT_MAX_TILES;

/// Loopback port of the local tile endpoint.
pub const DEFAULT_SERVER_PORT: u16 = 8765;

/// Name of the log file inside the log directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "fieldtile.log";

pub fn default_subdomains() -> Vec<String> {
    DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect()
}

/// Get the path to the config directory (~/.fieldtile).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fieldtile")
}

/// Get the path to the config file (~/.fieldtile/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Default tile store directory (~/.fieldtile/tiles).
pub fn default_cache_directory() -> PathBuf {
    config_directory().join("tiles")
}

/// Default log directory (~/.fieldtile/logs).
pub fn default_log_directory() -> PathBuf {
    config_directory().join("logs")
}
