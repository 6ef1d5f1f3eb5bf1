//! OpenNebula Core - Shared types for the OpenNebula provider.
//!
//! This crate provides:
//! - [`VersionInfo`], the parsed release of the remote OpenNebula system
//! - [`Diagnostic`] and [`Diagnostics`] for reporting configuration problems
//! - [`KeyedMutex`], the per-entity lock registry used by resource operations

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod diagnostics;
pub mod mutex_kv;
pub mod version;

pub use diagnostics::{AttributePath, Diagnostic, Diagnostics, Severity};
pub use mutex_kv::{KeyedGuard, KeyedMutex};
pub use version::{VersionInfo, VersionParseError};
