use serde::{Deserialize, Serialize};

/// Complete structured rendition of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub document_information: DocumentInfo,
    pub signature_blocks: Vec<SignatureBlock>,
    pub events: Vec<Event>,
}

impl StructuredDocument {
    pub const EMPTY: StructuredDocument = StructuredDocument {
        document_information: DocumentInfo::EMPTY,
        signature_blocks: Vec::new(),
        events: Vec::new(),
    };
}

/// Letter-level metadata found in the header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub document_number: Option<String>,
    pub document_date: Option<String>,
    pub document_city: Option<String>,
    pub subjects: Vec<String>,
    pub recipients: Vec<Recipient>,
    pub emitter_email: Option<String>,
    pub emitter_organizations: Vec<Organization>,
}

impl DocumentInfo {
    pub const EMPTY: DocumentInfo = DocumentInfo {
        document_number: None,
        document_date: None,
        document_city: None,
        subjects: Vec::new(),
        recipients: Vec::new(),
        emitter_email: None,
        emitter_organizations: Vec::new(),
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub position: String, // "" when no position follows the name
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureBlock {
    pub position: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub organizers: Vec<Organizer>,
    pub attendees: String,
    pub equipment: Vec<Equipment>,
    pub schedule: Vec<ScheduleItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organizer {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub item: String,
    pub quantity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
}
