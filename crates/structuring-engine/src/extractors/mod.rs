//! Pipeline stages
//!
//! Stages run in order, each taking the pool left by the one before:
//! 1. Normalizer - cleanup, ordering, document number repair
//! 2. Header - letter metadata
//! 3. Signature - closing signatory blocks
//! 4. Events - dated events with their details and agenda

pub mod events;
pub mod header;
pub mod normalizer;
pub mod schedule;
pub mod signature;

pub use events::{extract_events, EventBuilder};
pub use header::{extract_header, DocumentInfoBuilder};
pub use normalizer::normalize;
pub use signature::extract_signatures;
