//! Treeline CLI - resource resolution over a configured content tree
//!
//! This binary resolves, maps and queries resources and prints the results
//! as JSON.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use treeline::{open_factory, run, Command};

#[derive(Parser)]
#[command(name = "treeline")]
#[command(about = "Resolve, map and query resources in a content tree")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let factory = open_factory(cli.config.as_deref())?;
    let resolver = factory.session();
    let output = run(&cli.command, &resolver)?;
    resolver.close();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Initialize logging system
///
/// Logs go to stderr so stdout stays valid JSON.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!("{}={level}", env!("CARGO_PKG_NAME")))
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
