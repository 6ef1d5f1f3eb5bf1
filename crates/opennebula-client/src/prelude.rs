//! Prelude module - commonly used types for convenient import.
//!
//! Use `use opennebula_client::prelude::*;` to import all essential types.

pub use crate::{
    ApiErrorKind, ClientConfig, ClientError, ClientResult, Controller, FlowClient, OneClient,
    SystemApi,
};
