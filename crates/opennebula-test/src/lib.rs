//! OpenNebula Test - Shared test utilities for the OpenNebula provider.
//!
//! This crate provides fixtures, canned XML-RPC bodies and mock servers that
//! can be used across the provider crates as a dev-dependency.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_bootstrap() {
//!     let one = MockOpenNebula::start().await;
//!     let _version = one.expect_version("6.8.0").await;
//!
//!     let declared = test_declared_config(&one.endpoint());
//!     // ... run bootstrap against `declared`
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
