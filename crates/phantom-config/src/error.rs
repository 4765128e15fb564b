//! Error types for configuration loading.
//!
//! Loading never fails outright: every variant here is recovered locally and
//! handed back to the caller as a warning next to the defaulted value.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("invalid environment override {var}: {message}")]
    Env { var: String, message: String },
}

impl ConfigError {
    /// Whether the configuration file as a whole could not be used.
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            ConfigError::NotFound(_) | ConfigError::Io { .. } | ConfigError::Parse { .. }
        )
    }
}
