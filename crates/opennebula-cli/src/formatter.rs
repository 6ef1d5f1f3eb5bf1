//! Output rendering.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use colored::Colorize;
use opennebula_config::ValueSource;
use opennebula_core::{Diagnostic, Diagnostics, Severity};
use opennebula_provider::ProviderSession;
use serde::Serialize;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Pretty,
    Json,
}

/// What a successful configure cycle produced.
#[derive(Debug, Serialize)]
pub(crate) struct SessionSummary {
    pub(crate) version: String,
    pub(crate) endpoint: String,
    pub(crate) flow_endpoint: Option<String>,
    pub(crate) insecure: bool,
    pub(crate) default_tags: BTreeMap<String, String>,
    pub(crate) sources: BTreeMap<String, ValueSource>,
}

impl SessionSummary {
    pub(crate) fn from_session(session: &ProviderSession) -> Self {
        let config = session.config();
        Self {
            version: session.version().to_string(),
            endpoint: config.endpoint.clone(),
            flow_endpoint: session
                .controller()
                .flow()
                .ok()
                .map(|flow| flow.endpoint().to_string()),
            insecure: config.insecure,
            default_tags: session.default_tags().clone(),
            sources: config
                .sources
                .iter()
                .map(|(name, source)| (name.clone(), *source))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    configured: bool,
    diagnostics: &'a Diagnostics,
    session: Option<&'a SessionSummary>,
}

pub(crate) fn print_json(diags: &Diagnostics, summary: Option<&SessionSummary>) -> Result<()> {
    let report = Report {
        configured: summary.is_some(),
        diagnostics: diags,
        session: summary,
    };
    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}

pub(crate) fn print_pretty(diags: &Diagnostics, summary: Option<&SessionSummary>) {
    for diag in diags {
        println!("{}", render_diagnostic(diag));
    }
    if !diags.is_empty() {
        println!();
    }

    let Some(summary) = summary else {
        println!("{}", "Provider configuration failed".red().bold());
        return;
    };

    println!("{}", "Provider configured".green().bold());
    println!("  OpenNebula version: {}", summary.version);
    println!("  Endpoint:           {}", summary.endpoint);
    match &summary.flow_endpoint {
        Some(flow) => println!("  OneFlow endpoint:   {flow}"),
        None => println!("  OneFlow endpoint:   {}", "not configured".dimmed()),
    }
    if summary.insecure {
        println!("  TLS validation:     {}", "disabled".yellow());
    }

    if summary.default_tags.is_empty() {
        println!("  Default tags:       {}", "none".dimmed());
    } else {
        println!("  Default tags:");
        for (name, value) in &summary.default_tags {
            println!("    {name} = {value}");
        }
    }

    println!("  Value sources:");
    for (name, source) in &summary.sources {
        println!("    {name}: {}", source.to_string().dimmed());
    }
}

fn render_diagnostic(diag: &Diagnostic) -> String {
    let label = match diag.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
    };
    let location = diag
        .path
        .as_ref()
        .map(|path| format!(" [{path}]"))
        .unwrap_or_default();
    format!("{label}{location}: {}\n  {}", diag.summary, diag.detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_diagnostic_includes_attribute() {
        colored::control::set_override(false);
        let mut diags = Diagnostics::new();
        diags.add_attribute_error("endpoint", "Missing endpoint", "Set it.");
        let rendered = render_diagnostic(diags.iter().next().unwrap());
        assert_eq!(rendered, "error [endpoint]: Missing endpoint\n  Set it.");
    }

    #[test]
    fn test_render_global_warning() {
        colored::control::set_override(false);
        let rendered = render_diagnostic(&Diagnostic::warning("Heads up", "Details."));
        assert_eq!(rendered, "warning: Heads up\n  Details.");
    }
}
