//! Error model shared by the storage and configuration layers.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a persistent key/value backend.
///
/// Reads never fail at this layer (a missing or unreadable value is "absent");
/// only writes and backend initialization can.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be read or written.
    #[error("storage i/o failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An internal lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Invalid configuration value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: expected one of {expected}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ConfigError {
    pub fn invalid(var: &'static str, value: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidValue {
            var,
            value: value.into(),
            expected,
        }
    }
}
