//! Application error types.

use std::fmt;

use crate::config::ConfigFileError;
use crate::provider::ProviderError;
use crate::store::StoreError;

/// Errors that can occur while starting the application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to open the tile store.
    StoreOpen(StoreError),

    /// Failed to build the HTTP client or URL template.
    Provider(ProviderError),

    /// Configuration error.
    Config(String),

    /// Failed to create the Tokio runtime.
    RuntimeCreation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StoreOpen(e) => write!(f, "Failed to open tile store: {}", e),
            AppError::Provider(e) => write!(f, "Failed to set up tile provider: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::RuntimeCreation(msg) => {
                write!(f, "Failed to create Tokio runtime: {}", msg)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::StoreOpen(e) => Some(e),
            AppError::Provider(e) => Some(e),
            AppError::Config(_) => None,
            AppError::RuntimeCreation(_) => None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::StoreOpen(e)
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::Provider(e)
    }
}

impl From<ConfigFileError> for AppError {
    fn from(e: ConfigFileError) -> Self {
        AppError::Config(e.to_string())
    }
}
