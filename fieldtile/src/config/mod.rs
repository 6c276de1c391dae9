//! User configuration stored in `~/.fieldtile/config.ini`.
//!
//! # Example
//!
//! ```ignore
//! use fieldtile::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::load()?;
//! ConfigKey::DownloadMaxZoom.set(&mut config, "17")?;
//! config.save()?;
//! ```

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::ConfigFileError;
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{
    CacheSettings, ConfigFile, DownloadSettings, LoggingSettings, ServerSettings, TilesSettings,
};
