pub mod entity;
pub mod raw;
pub mod types;

pub use entity::{Entity, EntityTag, Span};
pub use raw::{decode_entities, EntityDecodeError, RawEntity};
pub use types::{
    DocumentInfo, Equipment, Event, Organization, Organizer, Recipient, ScheduleItem,
    SignatureBlock, StructuredDocument,
};
