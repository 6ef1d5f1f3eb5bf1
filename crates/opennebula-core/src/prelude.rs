//! Prelude module - commonly used types for convenient import.
//!
//! Use `use opennebula_core::prelude::*;` to import all essential types.

// Diagnostics
pub use crate::{AttributePath, Diagnostic, Diagnostics, Severity};

// Keyed locks
pub use crate::{KeyedGuard, KeyedMutex};

// Versions
pub use crate::{VersionInfo, VersionParseError};
