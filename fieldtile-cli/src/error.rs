//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use fieldtile::app::AppError;
use fieldtile::config::ConfigFileError;
use fieldtile::download::DownloadError;
use fieldtile::store::StoreError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the application
    Startup(AppError),
    /// Bulk download stopped
    Download(DownloadError),
    /// Tile could not be read from cache or network
    TileUnavailable { key: String, reason: String },
    /// Store operation failed
    Store(StoreError),
    /// Failed to write output file
    FileWrite { path: String, error: std::io::Error },
    /// Tile endpoint error
    Serve(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Download(DownloadError::TooManyTiles { .. }) => {
                eprintln!();
                eprintln!("Try one of:");
                eprintln!("  1. A smaller area");
                eprintln!("  2. A lower --max-zoom");
                eprintln!("  3. Raising the limit: fieldtile config set download.max_tiles 0");
            }
            CliError::Serve(_) => {
                eprintln!();
                eprintln!("Is another process using the port? Try --port.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Startup(e) => write!(f, "{}", e),
            CliError::Download(e) => write!(f, "Download failed: {}", e),
            CliError::TileUnavailable { key, reason } => {
                write!(f, "Tile {} is not cached and could not be fetched: {}", key, reason)
            }
            CliError::Store(e) => write!(f, "Tile store error: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Serve(e) => write!(f, "Tile endpoint error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Startup(e) => Some(e),
            CliError::Download(e) => Some(e),
            CliError::Store(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Serve(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::Startup(e)
    }
}

impl From<DownloadError> for CliError {
    fn from(e: DownloadError) -> Self {
        CliError::Download(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}
