//! secreview CLI
//!
//! Runs the security review checklist and inspects stored results.

mod commands;

use clap::{Parser, Subcommand};
use secreview_core::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// secreview - A pluggable security review checklist
#[derive(Parser)]
#[command(name = "secreview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json, json-pretty)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered checks grouped by namespace
    List(commands::list::ListArgs),

    /// Run the checklist and store the results
    Run(commands::run::RunArgs),

    /// Show the last stored result of a check
    Show(commands::CheckArgs),

    /// Explain what a check verifies and how to fix it
    Explain(commands::CheckArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;
    let verbose = cli.verbose || config.general.verbose;

    // Initialize logging
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let session = commands::Session::new(config)?;

    let format = match cli.format {
        Some(format) => format,
        None => session
            .config
            .general
            .output_format
            .parse::<OutputFormat>()
            .map_err(anyhow::Error::msg)?,
    };

    match cli.command {
        Commands::List(args) => commands::list::run(&session, args, format),
        Commands::Run(args) => commands::run::run(&session, args, format),
        Commands::Show(args) => commands::show::run(&session, args, format),
        Commands::Explain(args) => commands::explain::run(&session, args, format),
    }
}
