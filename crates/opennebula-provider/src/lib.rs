//! OpenNebula Provider - configuration bootstrap for the OpenNebula provider.
//!
//! One configure cycle turns a declared provider block and the
//! `OPENNEBULA_*` environment into a [`ProviderSession`]: resolved
//! configuration, authenticated API handles, the negotiated remote version,
//! default tags and the shared keyed lock registry. Problems are reported as
//! [`Diagnostics`](opennebula_core::Diagnostics); no session is produced when
//! any of them is an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use opennebula_config::DeclaredConfig;
//! use opennebula_provider::OpenNebulaProvider;
//!
//! # async fn run() {
//! let provider = OpenNebulaProvider::new();
//! let declared = DeclaredConfig::new()
//!     .with_endpoint("https://one.example.com:2633/RPC2")
//!     .with_username("oneadmin")
//!     .with_password("opennebula");
//!
//! let outcome = provider.configure(&declared).await;
//! for diag in &outcome.diagnostics {
//!     eprintln!("{diag}");
//! }
//! if let Some(session) = outcome.session {
//!     let _guard = session.lock("vm-42").await;
//!     // mutate VM 42
//! }
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod bootstrap;
pub mod factory;
pub mod negotiate;
pub mod schema;

mod provider;
mod session;

pub use bootstrap::{BootstrapOutcome, configure};
pub use provider::OpenNebulaProvider;
pub use schema::ProviderSchema;
pub use session::ProviderSession;
