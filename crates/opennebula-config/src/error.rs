//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading a declared configuration file.
///
/// Problems with the configuration *values* are reported as
/// [`Diagnostics`](opennebula_core::Diagnostics) instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// File that failed.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the provider block shape.
    #[error("failed to parse {path}: {source}")]
    ParseError {
        /// File that failed.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// The file was readable but rejected.
    #[error("invalid configuration at {field}: {message}")]
    ValidationError {
        /// Offending field or file.
        field: String,
        /// What is wrong.
        message: String,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
