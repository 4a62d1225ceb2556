//! Input loading and output rendering for the CLI

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use shared_types::StructuredDocument;
use structuring_engine::{ExtractionConfig, StructuringEngine};
use tracing::debug;

use crate::Args;

pub fn run(args: &Args) -> Result<String> {
    let entities = read_entities(&args.entities)?;

    let text = match &args.text {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read document text {}", path.display()))?,
        None => String::new(),
    };

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ExtractionConfig::default(),
    };

    structure_payload(&entities, &text, config, args.pretty)
}

fn read_entities(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read entities from stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(source).with_context(|| format!("Failed to read entities {}", source))
    }
}

fn load_config(path: &Path) -> Result<ExtractionConfig> {
    let config = ExtractionConfig::from_file(path)
        .with_context(|| format!("Invalid configuration {}", path.display()))?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Decode a recognizer payload, structure it and render the result as JSON
pub fn structure_payload(
    entities_json: &str,
    text: &str,
    config: ExtractionConfig,
    pretty: bool,
) -> Result<String> {
    let payload: Value =
        serde_json::from_str(entities_json).context("Entity list is not valid JSON")?;

    let engine = StructuringEngine::with_config(config);
    let document: StructuredDocument = engine
        .structure_json(text, &payload)
        .context("Failed to decode recognizer entities")?;

    let rendered = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(rendered)
}
