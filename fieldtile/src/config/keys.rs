//! Configuration key access and validation.
//!
//! Typed get/set of individual settings by `section.key` name, used by the
//! CLI `config` subcommand and by the INI parser.

use std::str::FromStr;

use thiserror::Error;

use super::defaults::MAX_DOWNLOAD_CONCURRENCY;
use super::parser::expand_tilde;
use super::settings::ConfigFile;
use super::writer::path_to_string;
use crate::coord::MAX_ZOOM;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    TilesUrlTemplate,
    TilesSubdomains,
    TilesUserAgent,
    TilesTimeoutSecs,
    TilesMaxRetries,

    CacheDirectory,

    DownloadMinZoom,
    DownloadMaxZoom,
    DownloadConcurrency,
    DownloadMaxTiles,

    ServerPort,

    LoggingDirectory,
}

const ALL_KEYS: [ConfigKey; 12] = [
    ConfigKey::TilesUrlTemplate,
    ConfigKey::TilesSubdomains,
    ConfigKey::TilesUserAgent,
    ConfigKey::TilesTimeoutSecs,
    ConfigKey::TilesMaxRetries,
    ConfigKey::CacheDirectory,
    ConfigKey::DownloadMinZoom,
    ConfigKey::DownloadMaxZoom,
    ConfigKey::DownloadConcurrency,
    ConfigKey::DownloadMaxTiles,
    ConfigKey::ServerPort,
    ConfigKey::LoggingDirectory,
];

/// Upper bound accepted for `tiles.max_retries`.
const MAX_RETRIES_LIMIT: u32 = 10;

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Get the canonical key name (e.g., "download.min_zoom").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::TilesUrlTemplate => "tiles.url_template",
            ConfigKey::TilesSubdomains => "tiles.subdomains",
            ConfigKey::TilesUserAgent => "tiles.user_agent",
            ConfigKey::TilesTimeoutSecs => "tiles.timeout_secs",
            ConfigKey::TilesMaxRetries => "tiles.max_retries",
            ConfigKey::CacheDirectory => "cache.directory",
            ConfigKey::DownloadMinZoom => "download.min_zoom",
            ConfigKey::DownloadMaxZoom => "download.max_zoom",
            ConfigKey::DownloadConcurrency => "download.concurrency",
            ConfigKey::DownloadMaxTiles => "download.max_tiles",
            ConfigKey::ServerPort => "server.port",
            ConfigKey::LoggingDirectory => "logging.directory",
        }
    }

    /// Get the section name (e.g., "download").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "min_zoom").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::TilesUrlTemplate => config.tiles.url_template.clone(),
            ConfigKey::TilesSubdomains => config.tiles.subdomains.join(","),
            ConfigKey::TilesUserAgent => config.tiles.user_agent.clone(),
            ConfigKey::TilesTimeoutSecs => config.tiles.timeout_secs.to_string(),
            ConfigKey::TilesMaxRetries => config.tiles.max_retries.to_string(),
            ConfigKey::CacheDirectory => path_to_string(&config.cache.directory),
            ConfigKey::DownloadMinZoom => config.download.min_zoom.to_string(),
            ConfigKey::DownloadMaxZoom => config.download.max_zoom.to_string(),
            ConfigKey::DownloadConcurrency => config.download.concurrency.to_string(),
            ConfigKey::DownloadMaxTiles => config.download.max_tiles.to_string(),
            ConfigKey::ServerPort => config.server.port.to_string(),
            ConfigKey::LoggingDirectory => path_to_string(&config.logging.directory),
        }
    }

    /// Validate `value` and store it in `config`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        match self {
            ConfigKey::TilesUrlTemplate => {
                for placeholder in ["{z}", "{x}", "{y}"] {
                    if !value.contains(placeholder) {
                        return Err(self.invalid(format!("missing {} placeholder", placeholder)));
                    }
                }
                config.tiles.url_template = value.to_string();
            }
            ConfigKey::TilesSubdomains => {
                config.tiles.subdomains = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            ConfigKey::TilesUserAgent => {
                if value.is_empty() {
                    return Err(self.invalid("must not be empty"));
                }
                config.tiles.user_agent = value.to_string();
            }
            ConfigKey::TilesTimeoutSecs => {
                let secs: u64 = self.parse(value, "must be a positive integer (seconds)")?;
                if secs == 0 {
                    return Err(self.invalid("must be a positive integer (seconds)"));
                }
                config.tiles.timeout_secs = secs;
            }
            ConfigKey::TilesMaxRetries => {
                let retries: u32 = self.parse(value, "must be a non-negative integer")?;
                if retries > MAX_RETRIES_LIMIT {
                    return Err(self.invalid(format!("must be at most {}", MAX_RETRIES_LIMIT)));
                }
                config.tiles.max_retries = retries;
            }
            ConfigKey::CacheDirectory => {
                config.cache.directory = self.directory(value)?;
            }
            ConfigKey::DownloadMinZoom => {
                config.download.min_zoom = self.zoom(value)?;
            }
            ConfigKey::DownloadMaxZoom => {
                config.download.max_zoom = self.zoom(value)?;
            }
            ConfigKey::DownloadConcurrency => {
                let reason = format!("must be between 1 and {}", MAX_DOWNLOAD_CONCURRENCY);
                let n: usize = self.parse(value, &reason)?;
                if !(1..=MAX_DOWNLOAD_CONCURRENCY).contains(&n) {
                    return Err(self.invalid(reason));
                }
                config.download.concurrency = n;
            }
            ConfigKey::DownloadMaxTiles => {
                config.download.max_tiles =
                    self.parse(value, "must be a non-negative integer (0 = unlimited)")?;
            }
            ConfigKey::ServerPort => {
                let port: u16 = self.parse(value, "must be a port number (1-65535)")?;
                if port == 0 {
                    return Err(self.invalid("must be a port number (1-65535)"));
                }
                config.server.port = port;
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = self.directory(value)?;
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> ConfigKeyError {
        ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: reason.into(),
        }
    }

    fn parse<T: FromStr>(&self, value: &str, reason: &str) -> Result<T, ConfigKeyError> {
        value.parse().map_err(|_| self.invalid(reason))
    }

    fn zoom(&self, value: &str) -> Result<u8, ConfigKeyError> {
        let reason = format!("must be a zoom level between 0 and {}", MAX_ZOOM);
        let zoom: u8 = self.parse(value, &reason)?;
        if zoom > MAX_ZOOM {
            return Err(self.invalid(reason));
        }
        Ok(zoom)
    }

    fn directory(&self, value: &str) -> Result<std::path::PathBuf, ConfigKeyError> {
        if value.is_empty() {
            return Err(self.invalid("must not be empty"));
        }
        Ok(expand_tilde(value))
    }
}
