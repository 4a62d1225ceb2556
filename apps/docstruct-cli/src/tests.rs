//! Tests for the docstruct front end
//!
//! - Payload decoding and JSON rendering
//! - Configuration overrides reaching the engine
//! - Arbitrary input never panics

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use structuring_engine::ExtractionConfig;

use crate::run::structure_payload;

const PAYLOAD: &str = r#"[
    {"entity_group": "SUBJECT", "word": "Undangan Rapat", "start": 40, "end": 54, "score": 0.98},
    {"entity_group": "EMAIL", "word": "sekretariat", "start": 400, "end": 411, "score": "0.91"}
]"#;

fn render(payload: &str, config: ExtractionConfig) -> Value {
    let output = structure_payload(payload, "", config, false).unwrap();
    serde_json::from_str(&output).unwrap()
}

#[test]
fn test_payload_is_structured() {
    let value = render(PAYLOAD, ExtractionConfig::default());
    assert_eq!(value["document_information"]["subjects"], json!(["Undangan Rapat"]));
    assert_eq!(value["document_information"]["emitter_email"], json!(null));
    assert_eq!(value["events"], json!([]));
}

#[test]
fn test_config_override_moves_header_zone() {
    let config: ExtractionConfig = "[header_zone]\npolicy = \"fixed\"\nend = 500\n".parse().unwrap();
    let value = render(PAYLOAD, config);
    assert_eq!(
        value["document_information"]["emitter_email"],
        json!("sekretariat@gmail.com")
    );
}

#[test]
fn test_pretty_output_spans_lines() {
    let output = structure_payload("[]", "", ExtractionConfig::default(), true).unwrap();
    assert!(output.contains('\n'));
}

#[test]
fn test_invalid_json_is_an_error() {
    let err = structure_payload("{not json", "", ExtractionConfig::default(), false).unwrap_err();
    assert!(err.to_string().contains("not valid JSON"));
}

#[test]
fn test_record_without_tag_is_an_error() {
    let result = structure_payload(r#"[{"word": "Budi"}]"#, "", ExtractionConfig::default(), false);
    assert!(result.is_err());
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: arbitrary input text is rejected or structured, never a panic
        #[test]
        fn arbitrary_payload_no_panic(payload in "\\PC*") {
            let _ = structure_payload(&payload, "", ExtractionConfig::default(), false);
        }

        /// Property: well-formed records always produce a document
        #[test]
        fn well_formed_records_structure(
            tag in "(PER|EVT|EVTDATE|POSITION|DOCNUM|CITY)",
            word in "[A-Za-z ]{1,20}",
            start in 0usize..1000,
        ) {
            let payload = json!([{"entity_group": tag, "word": word, "start": start, "end": start + 5}]);
            let output = structure_payload(&payload.to_string(), "", ExtractionConfig::default(), false);
            prop_assert!(output.is_ok());
        }
    }
}
