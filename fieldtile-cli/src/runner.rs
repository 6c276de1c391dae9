//! CLI runner for common setup and operations.
//!
//! Loads the config file, initializes logging and owns the Tokio runtime
//! every command runs its async work on.

use std::future::Future;
use std::path::Path;

use fieldtile::app::{AppConfig, AppError, FieldTileApp};
use fieldtile::config::{ConfigFile, DEFAULT_LOG_FILE_NAME};
use fieldtile::logging::{init_logging, LoggingGuard};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps the file writer flushing while the runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Create a runner, loading config and initializing logging.
    ///
    /// Log output always goes to the log file. With `verbose` it is also
    /// mirrored to stderr, which interleaves with progress bars.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging_guard =
            init_logging(&config.logging.directory, DEFAULT_LOG_FILE_NAME, verbose)
                .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| AppError::RuntimeCreation(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            runtime,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_path(&self) -> &Path {
        self.logging_guard.log_path()
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("FieldTile v{}", fieldtile::VERSION);
        info!("FieldTile CLI: {} command", command);
    }

    /// Run a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Open the store and HTTP client described by the config file.
    pub fn start_app(&self) -> Result<FieldTileApp, CliError> {
        let app_config = AppConfig::from_config_file(&self.config)?;
        let app = self.block_on(FieldTileApp::start(app_config))?;
        info!(cache = %self.config.cache.directory.display(), "Application ready");
        Ok(app)
    }
}
