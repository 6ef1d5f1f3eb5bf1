//! Check command: run one configure cycle and report the result.

use std::path::Path;

use anyhow::{Context, Result, bail};
use opennebula_config::{DeclaredConfig, loader};
use opennebula_provider::OpenNebulaProvider;

use crate::formatter::{self, OutputFormat, SessionSummary};

/// Configure the provider from `config` (or the environment alone) and print
/// diagnostics plus a session summary.
///
/// Fails when any error diagnostic was produced.
pub(crate) async fn run_check(config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let declared = match config {
        Some(path) => loader::load_file(path)
            .with_context(|| format!("failed to load provider configuration from {}", path.display()))?,
        None => DeclaredConfig::new(),
    };

    let provider = OpenNebulaProvider::new();
    let outcome = provider.configure(&declared).await;
    let summary = outcome.session.as_ref().map(SessionSummary::from_session);

    match format {
        OutputFormat::Pretty => formatter::print_pretty(&outcome.diagnostics, summary.as_ref()),
        OutputFormat::Json => formatter::print_json(&outcome.diagnostics, summary.as_ref())?,
    }

    let errors = outcome.diagnostics.errors().count();
    if errors > 0 {
        bail!("provider configuration failed with {errors} error(s)");
    }
    Ok(())
}
