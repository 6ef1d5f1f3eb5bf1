//! Prelude module - commonly used types for convenient import.
//!
//! Use `use opennebula_provider::prelude::*;` to import all essential types.

pub use crate::{BootstrapOutcome, OpenNebulaProvider, ProviderSchema, ProviderSession, configure};
