//! OpenNebula Telemetry - Logging for the OpenNebula provider.
//!
//! This crate provides configurable `tracing` subscriber setup with pretty,
//! compact and JSON formats. Logs go to stderr by default because stdout
//! belongs to the host protocol.
//!
//! # Example
//!
//! ```rust,no_run
//! use opennebula_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), opennebula_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("opennebula_client=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("configuring provider");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
