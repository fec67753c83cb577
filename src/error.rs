//! Error types for configuration composition, loading and reload.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while composing, materializing or reloading configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Required configuration file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid command-line argument: {0}")]
    CommandLineFormat(String),

    #[error("Invalid switch mapping: {0}")]
    InvalidSwitchMapping(String),

    #[error("Invalid user secrets id '{0}': only ASCII letters, digits, '.', '_' and '-' are allowed")]
    InvalidSecretsId(String),

    #[error("File watch error: {0}")]
    Watch(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl ConfigurationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigurationError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<notify::Error> for ConfigurationError {
    fn from(err: notify::Error) -> Self {
        ConfigurationError::Watch(err.to_string())
    }
}
