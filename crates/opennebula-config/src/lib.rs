//! Provider configuration for OpenNebula.
//!
//! # Resolution
//!
//! The provider block arrives as a [`DeclaredConfig`] whose fields are
//! `Unknown`, `Absent` or `Present`. Resolution runs in three steps, each
//! appending to a shared [`Diagnostics`](opennebula_core::Diagnostics) list:
//!
//! 1. [`resolve::check_unknowns`] rejects credentials that are not known yet
//! 2. [`resolve::resolve`] merges declared values with `OPENNEBULA_*`
//!    variables (declared, then environment, then default)
//! 3. [`validate::validate`] reports every missing or malformed field at once
//!
//! `default_tags` blocks are folded separately by
//! [`tags::aggregate_default_tags`].
//!
//! # Usage
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use opennebula_config::{DeclaredConfig, resolve, validate};
//! use opennebula_core::Diagnostics;
//!
//! let declared = DeclaredConfig::new()
//!     .with_endpoint("https://one.example.com:2633/RPC2")
//!     .with_username("oneadmin")
//!     .with_password("opennebula");
//!
//! let mut diags = Diagnostics::new();
//! resolve::check_unknowns(&declared, &mut diags);
//! // Normally `env::collect_env_vars()`.
//! let env = HashMap::new();
//! let resolved = resolve::resolve(&declared, &env, &mut diags);
//! validate::validate(&resolved, &mut diags);
//! assert!(!diags.has_error());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

/// Environment variable fallbacks.
pub mod env;
/// Configuration error types.
pub mod error;
/// Declared configuration files.
pub mod loader;
/// Declared/environment merge.
pub mod resolve;
/// `default_tags` aggregation.
pub mod tags;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use tags::{TagSet, aggregate_default_tags};
pub use types::{Declared, DeclaredConfig, FieldSources, ResolvedConfig, ValueSource};
