//! Settings structs mirroring the sections of `config.ini`.

use std::path::PathBuf;

use super::defaults::*;

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub tiles: TilesSettings,
    pub cache: CacheSettings,
    pub download: DownloadSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

/// `[tiles]`: remote tile server.
#[derive(Debug, Clone, PartialEq)]
pub struct TilesSettings {
    /// URL with `{s}`, `{z}`, `{x}`, `{y}` placeholders.
    pub url_template: String,
    /// Values substituted for `{s}`.
    pub subdomains: Vec<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Retries of a transient failure during bulk download.
    pub max_retries: u32,
}

/// `[cache]`: where tiles are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub directory: PathBuf,
}

/// `[download]`: bulk download defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub concurrency: usize,
    /// Largest request accepted; 0 disables the limit.
    pub max_tiles: u64,
}

/// `[server]`: local tile endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub port: u16,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
}

impl Default for TilesSettings {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_TILE_URL_TEMPLATE.to_string(),
            subdomains: default_subdomains(),
            user_agent: DEFAULT_TILE_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TILE_TIMEOUT_SECS,
            max_retries: DEFAULT_TILE_MAX_RETRIES,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_DOWNLOAD_MIN_ZOOM,
            max_zoom: DEFAULT_DOWNLOAD_MAX_ZOOM,
            concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
            max_tiles: DEFAULT_DOWNLOAD_MAX_TILES,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVER_PORT,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
        }
    }
}
