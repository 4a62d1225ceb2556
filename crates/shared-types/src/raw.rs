//! Adapter from recognizer output records to [`Entity`]
//!
//! Token-classification pipelines emit records such as
//! `{"entity_group": "PER", "word": "Budi", "start": 10, "end": 14, "score": 0.98}`.
//! Depending on the runtime, numbers may arrive as floats (`10.0`) or as
//! strings (`"0.98"`) after platform numeric types were stringified. This
//! module coerces all of that into the core entity type.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::entity::{Entity, EntityTag, Span};

#[derive(Error, Debug)]
pub enum EntityDecodeError {
    #[error("Expected a JSON array of entity records")]
    NotAnArray,

    #[error("Entity record {index} is malformed: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Entity record {index} has no entity tag")]
    MissingTag { index: usize },

    #[error("Entity record {index} has no text")]
    MissingText { index: usize },
}

/// One recognizer record, as loosely typed as it arrives
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntity {
    #[serde(default, alias = "group", alias = "entity")]
    pub entity_group: Option<String>,

    #[serde(default, alias = "text", alias = "entity_text")]
    pub word: Option<String>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub start: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub end: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub score: Option<f64>,
}

impl RawEntity {
    /// Convert into a core entity. `index` is only used for error reporting.
    pub fn into_entity(self, index: usize) -> Result<Entity, EntityDecodeError> {
        let tag = self
            .entity_group
            .filter(|g| !g.trim().is_empty())
            .map(EntityTag::from)
            .ok_or(EntityDecodeError::MissingTag { index })?;
        let text = self.word.ok_or(EntityDecodeError::MissingText { index })?;

        let span = match (self.start.and_then(to_offset), self.end.and_then(to_offset)) {
            (Some(start), Some(end)) if start < end => Some(Span::new(start, end)),
            _ => None,
        };

        Ok(Entity {
            tag,
            text,
            span,
            score: self.score.filter(|s| s.is_finite()).unwrap_or(1.0),
        })
    }
}

/// Decode a recognizer payload.
///
/// Accepts either a bare array of records or an object wrapping the array
/// under an `"entities"` key.
pub fn decode_entities(payload: &Value) -> Result<Vec<Entity>, EntityDecodeError> {
    let records = match payload {
        Value::Array(records) => records,
        Value::Object(map) => match map.get("entities") {
            Some(Value::Array(records)) => records,
            _ => return Err(EntityDecodeError::NotAnArray),
        },
        _ => return Err(EntityDecodeError::NotAnArray),
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let raw = RawEntity::deserialize(record)
                .map_err(|source| EntityDecodeError::InvalidRecord { index, source })?;
            raw.into_entity(index)
        })
        .collect()
}

fn to_offset(value: f64) -> Option<usize> {
    if value.is_finite() && value >= 0.0 {
        Some(value as usize)
    } else {
        None
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
