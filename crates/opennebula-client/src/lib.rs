//! OpenNebula API clients.
//!
//! - [`OneClient`]: the XML-RPC API, authenticated with a
//!   `username:password` session string
//! - [`FlowClient`]: the OneFlow REST API, authenticated with basic auth
//! - [`Controller`]: both of the above composed into one shareable handle
//!
//! Constructing a client never touches the network. The first request is
//! usually the release query made during provider configuration.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

mod client;
mod controller;
mod error;
mod flow;
pub mod xmlrpc;

pub use client::{ClientConfig, DEFAULT_TIMEOUT, OneClient};
pub use controller::{Controller, SystemApi};
pub use error::{ApiErrorKind, ClientError, ClientResult};
pub use flow::FlowClient;
