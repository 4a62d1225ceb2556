//! Tunable thresholds for the structuring heuristics
//!
//! Every character-distance constant used by the pipeline lives in
//! [`ExtractionConfig`]. The defaults reproduce the behavior tuned on
//! scanned parish letters; a TOML file can override any subset of them.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Thresholds and defaults for all four stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// An ORG counts as the sender when it starts before the first
    /// metadata entity's start plus this window (exclusive)
    pub header_org_window: usize,
    /// Where sender-side metadata (the emitter email) may appear
    pub header_zone: HeaderZone,
    /// Recipient end to position start (exclusive)
    pub recipient_position_max_gap: usize,
    /// City end to document date start (exclusive)
    pub city_date_max_gap: usize,
    /// Largest gap between neighbours of a position or person run (inclusive)
    pub signature_run_gap: usize,
    /// Position run end to the first person of the name run (inclusive)
    pub signature_name_reach: usize,
    /// Run members this close are fragments of one phrase (inclusive)
    pub signature_fragment_gap: usize,
    /// Person end to phone start (exclusive)
    pub organizer_contact_max_gap: usize,
    /// Item end to quantity start (exclusive)
    pub equipment_quantity_max_gap: usize,
    /// Schedule time end to schedule item start (exclusive)
    pub schedule_time_max_gap: usize,
    /// Farther time end to nearer time start for a time range (exclusive)
    pub schedule_range_gap: usize,
    /// Duration end to schedule item start (exclusive)
    pub schedule_duration_max_gap: usize,
    /// Document number end to a trailing date fragment (inclusive)
    pub docnum_date_max_gap: usize,
    pub default_equipment_quantity: String,
    /// Appended as `@domain` to truncated email addresses
    pub default_email_domain: String,
    /// Email text containing any of these is left alone even without `@`
    pub known_email_domains: Vec<String>,
    /// Bare years outside this range are not document-number suffixes
    pub min_year: u32,
    pub max_year: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            header_org_window: 150,
            header_zone: HeaderZone::default(),
            recipient_position_max_gap: 50,
            city_date_max_gap: 50,
            signature_run_gap: 15,
            signature_name_reach: 75,
            signature_fragment_gap: 1,
            organizer_contact_max_gap: 50,
            equipment_quantity_max_gap: 10,
            schedule_time_max_gap: 50,
            schedule_range_gap: 20,
            schedule_duration_max_gap: 20,
            docnum_date_max_gap: 5,
            default_equipment_quantity: "1".to_string(),
            default_email_domain: "gmail.com".to_string(),
            known_email_domains: vec!["gmail.com".to_string()],
            min_year: 1990,
            max_year: 2099,
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or the resulting thresholds fail [`ExtractionConfig::validate`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        content.parse()
    }

    /// Reject combinations the heuristics cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let HeaderZone::Relative { fraction } = self.header_zone {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "header_zone fraction must be in (0, 1], got {}",
                    fraction
                )));
            }
        }
        if self.default_email_domain.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_email_domain must not be empty".to_string(),
            ));
        }
        if self.min_year > self.max_year {
            return Err(ConfigError::Invalid(format!(
                "min_year {} is after max_year {}",
                self.min_year, self.max_year
            )));
        }
        Ok(())
    }
}

impl FromStr for ExtractionConfig {
    type Err = ConfigError;

    /// Parse configuration from a TOML string; missing keys keep their defaults
    ///
    /// ```
    /// use structuring_engine::config::{ExtractionConfig, HeaderZone};
    ///
    /// let config: ExtractionConfig = r#"
    ///     signature_name_reach = 90
    ///
    ///     [header_zone]
    ///     policy = "relative"
    ///     fraction = 0.25
    /// "#
    /// .parse()
    /// .unwrap();
    /// assert_eq!(config.signature_name_reach, 90);
    /// assert_eq!(config.header_zone, HeaderZone::Relative { fraction: 0.25 });
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: ExtractionConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

/// How the leading "header" portion of a document is delimited.
///
/// One policy is chosen per configuration and used for every header-zone
/// decision; the two are never combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum HeaderZone {
    /// Everything starting before a fixed character offset
    Fixed { end: usize },
    /// Everything starting before a fraction of the document length
    Relative { fraction: f64 },
}

impl Default for HeaderZone {
    fn default() -> Self {
        HeaderZone::Fixed { end: 300 }
    }
}

impl HeaderZone {
    /// Exclusive offset where the header zone ends for a document of
    /// `document_len` characters
    pub fn limit(&self, document_len: usize) -> usize {
        match *self {
            HeaderZone::Fixed { end } => end,
            HeaderZone::Relative { fraction } => (document_len as f64 * fraction).ceil() as usize,
        }
    }
}
