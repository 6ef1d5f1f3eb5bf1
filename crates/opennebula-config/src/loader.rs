//! Declared configuration files.
//!
//! The host normally hands the provider block over directly. For local checks
//! the same block can be written as TOML:
//!
//! ```toml
//! endpoint = "https://one.example.com:2633/RPC2"
//! username = "oneadmin"
//!
//! [[default_tags]]
//! tags = { team = "platform" }
//! ```

use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::DeclaredConfig;

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load a declared configuration from a TOML file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, is larger than
/// 1 MB, or does not describe a provider block.
pub fn load_file(path: &Path) -> ConfigResult<DeclaredConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    // Check size after reading to avoid TOCTOU between stat and read.
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let declared = from_toml_str(&content).map_err(|e| match e {
        ConfigError::ParseError { source, .. } => ConfigError::ParseError {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })?;
    debug!(path = %path.display(), "loaded declared provider configuration");
    Ok(declared)
}

/// Parse a declared configuration from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] for malformed TOML or unknown keys.
pub fn from_toml_str(content: &str) -> ConfigResult<DeclaredConfig> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: "<inline>".to_owned(),
        source: e,
    })
}
