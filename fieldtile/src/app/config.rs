//! Application configuration for FieldTileApp.
//!
//! `AppConfig` carries everything needed to wire the store, the HTTP client,
//! the offline provider and the bulk downloader. It is usually built from
//! the user's `config.ini` via [`AppConfig::from_config_file`].

use std::path::PathBuf;

use super::error::AppError;
use crate::config::{ConfigFile, DEFAULT_SERVER_PORT};
use crate::download::{DEFAULT_MAX_TILES, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use crate::provider::{
    RetryPolicy, TileUrlTemplate, DEFAULT_RETRY_BASE_DELAY, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};

/// Where tiles are kept.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreBackend {
    /// Persistent store rooted at a directory.
    Disk(PathBuf),
    /// Non-persistent store, lost when the process exits.
    Memory,
}

/// Application configuration combining all component configs.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreBackend,

    /// Remote tile server.
    pub template: TileUrlTemplate,

    pub user_agent: String,

    pub timeout_secs: u64,

    /// Retry policy for bulk download fetches.
    pub retry: RetryPolicy,

    /// Tiles in flight during bulk download.
    pub concurrency: usize,

    /// Largest download accepted; `None` for no limit.
    pub max_tiles: Option<u64>,

    /// Zoom range used when a download does not specify one.
    pub default_min_zoom: u8,
    pub default_max_zoom: u8,

    /// Port of the local tile endpoint.
    pub server_port: u16,
}

impl AppConfig {
    /// Create a config with defaults, storing tiles under `cache_dir`.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            store: StoreBackend::Disk(cache_dir),
            template: TileUrlTemplate::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
            concurrency: 1,
            max_tiles: Some(DEFAULT_MAX_TILES),
            default_min_zoom: DEFAULT_MIN_ZOOM,
            default_max_zoom: DEFAULT_MAX_ZOOM,
            server_port: DEFAULT_SERVER_PORT,
        }
    }

    /// Config with defaults and an in-memory store.
    pub fn in_memory() -> Self {
        Self {
            store: StoreBackend::Memory,
            ..Self::new(PathBuf::new())
        }
    }

    /// Create application config from the user's configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Result<Self, AppError> {
        config.validate()?;

        let template = TileUrlTemplate::new(
            config.tiles.url_template.clone(),
            config.tiles.subdomains.clone(),
        )?;

        Ok(Self {
            store: StoreBackend::Disk(config.cache.directory.clone()),
            template,
            user_agent: config.tiles.user_agent.clone(),
            timeout_secs: config.tiles.timeout_secs,
            retry: RetryPolicy {
                max_retries: config.tiles.max_retries,
                base_delay: DEFAULT_RETRY_BASE_DELAY,
            },
            concurrency: config.download.concurrency,
            max_tiles: (config.download.max_tiles > 0).then_some(config.download.max_tiles),
            default_min_zoom: config.download.min_zoom,
            default_max_zoom: config.download.max_zoom,
            server_port: config.server.port,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_tiles(mut self, max_tiles: Option<u64>) -> Self {
        self.max_tiles = max_tiles;
        self
    }
}
