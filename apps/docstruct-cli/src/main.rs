//! docstruct command-line front end
//!
//! Reads the entity list a named-entity recognizer produced for one letter,
//! runs the structuring pipeline and prints the structured document as JSON.
//!
//! ```text
//! docstruct --entities entities.json --text surat.txt --pretty
//! cat entities.json | docstruct --entities - --config thresholds.toml
//! ```
//!
//! Output goes to stdout, logs to stderr.

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod run;
#[cfg(test)]
mod tests;

/// Command-line arguments for docstruct
#[derive(Parser, Debug)]
#[command(name = "docstruct")]
#[command(about = "Structure recognizer entities into letter metadata, signatures and events")]
pub struct Args {
    /// JSON entity list, or `-` to read stdin
    #[arg(short, long)]
    entities: String,

    /// Original document text
    #[arg(short, long)]
    text: Option<PathBuf>,

    /// TOML file overriding extraction thresholds
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Structuring entities from {}", args.entities);

    let output = run::run(&args)?;
    println!("{}", output);

    Ok(())
}
