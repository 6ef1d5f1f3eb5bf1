//! Schema command.

use anyhow::{Context, Result};
use opennebula_provider::ProviderSchema;

/// Print the provider block schema.
pub(crate) fn run_schema() -> Result<()> {
    let json = serde_json::to_string_pretty(&ProviderSchema::opennebula())
        .context("failed to serialize provider schema")?;
    println!("{json}");
    Ok(())
}
