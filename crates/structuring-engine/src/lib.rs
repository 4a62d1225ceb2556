pub mod config;
pub mod error;
pub mod extractors;
pub mod patterns;
pub mod pool;
pub mod proximity;

pub use config::{ExtractionConfig, HeaderZone};
pub use error::ConfigError;
pub use pool::{ClaimLedger, EntityPool, Stage};

use serde_json::Value;
use shared_types::{decode_entities, Entity, EntityDecodeError, StructuredDocument};
use tracing::{info, instrument};

/// StructuringEngine entry point
#[derive(Debug, Clone)]
pub struct StructuringEngine {
    config: ExtractionConfig,
}

impl StructuringEngine {
    pub fn new() -> Self {
        Self::with_config(ExtractionConfig::default())
    }

    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Turn recognizer entities for one document into a structured document
    pub fn structure(&self, text: &str, entities: Vec<Entity>) -> StructuredDocument {
        self.structure_with_ledger(text, entities).0
    }

    /// Same as [`structure`](Self::structure), also returning which stage
    /// consumed each normalized entity
    #[instrument(skip_all, fields(entities = entities.len()))]
    pub fn structure_with_ledger(
        &self,
        text: &str,
        entities: Vec<Entity>,
    ) -> (StructuredDocument, ClaimLedger) {
        let document_len = document_length(text, &entities);
        let normalized = extractors::normalize(entities, &self.config);
        let pool = EntityPool::new(normalized);
        if pool.is_empty() {
            return (StructuredDocument::EMPTY, pool.into_ledger());
        }

        let (document_information, pool) =
            extractors::extract_header(pool, document_len, &self.config);
        let (signature_blocks, pool) = extractors::extract_signatures(pool, &self.config);
        let (events, pool) = extractors::extract_events(pool, &self.config);

        let ledger = pool.into_ledger();
        info!(
            "Structured document: {} signature blocks, {} events, {} entities unconsumed",
            signature_blocks.len(),
            events.len(),
            ledger.unconsumed().len()
        );

        let document = StructuredDocument {
            document_information,
            signature_blocks,
            events,
        };
        (document, ledger)
    }

    /// Decode a recognizer JSON payload and structure it
    pub fn structure_json(
        &self,
        text: &str,
        payload: &Value,
    ) -> Result<StructuredDocument, EntityDecodeError> {
        let entities = decode_entities(payload)?;
        Ok(self.structure(text, entities))
    }
}

impl Default for StructuringEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Character length of the text, or the furthest entity end when no text was given
fn document_length(text: &str, entities: &[Entity]) -> usize {
    if text.is_empty() {
        entities.iter().filter_map(Entity::end).max().unwrap_or(0)
    } else {
        text.chars().count()
    }
}
