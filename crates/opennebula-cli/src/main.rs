//! OpenNebula CLI - provider configuration checks.
//!
//! Runs the provider's configure cycle outside of a host so that credentials,
//! endpoints and `default_tags` can be verified from a shell.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod formatter;

use formatter::OutputFormat;

/// OpenNebula provider tooling
#[derive(Parser)]
#[command(name = "opennebula")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty (default) or json
    #[arg(long, global = true, default_value = "pretty")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the provider and report diagnostics
    Check {
        /// TOML file holding the provider block (environment only if omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the provider block schema as JSON
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    let log_config =
        opennebula_telemetry::LogConfig::new(level).with_format(opennebula_telemetry::LogFormat::Compact);
    if let Err(e) = opennebula_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let output_format = match cli.format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Pretty,
    };

    match cli.command {
        Commands::Check { config } => commands::check::run_check(config.as_deref(), output_format).await,
        Commands::Schema => commands::schema::run_schema(),
    }
}
