//! Recognizer entities: the input unit of the structuring pipeline

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity-type tag emitted by the recognizer.
///
/// The vocabulary is open: tags the pipeline has no rule for are kept
/// verbatim in [`EntityTag::Other`] and end up in the unconsumed remainder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityTag {
    DocNum,
    DocDate,
    Date,
    City,
    Subject,
    Recipient,
    RecipientPosition,
    Org,
    Email,
    Position,
    Per,
    Phone,
    Evt,
    EvtDate,
    EvtTime,
    EvtLoc,
    Item,
    ItemQty,
    PeoQty,
    ScheduleItem,
    ScheduleTime,
    ScheduleDuration,
    Other(String),
}

impl EntityTag {
    pub fn as_str(&self) -> &str {
        match self {
            EntityTag::DocNum => "DOCNUM",
            EntityTag::DocDate => "DOCDATE",
            EntityTag::Date => "DATE",
            EntityTag::City => "CITY",
            EntityTag::Subject => "SUBJECT",
            EntityTag::Recipient => "RECIPIENT",
            EntityTag::RecipientPosition => "RECIPIENT_POSITION",
            EntityTag::Org => "ORG",
            EntityTag::Email => "EMAIL",
            EntityTag::Position => "POSITION",
            EntityTag::Per => "PER",
            EntityTag::Phone => "PHONE",
            EntityTag::Evt => "EVT",
            EntityTag::EvtDate => "EVTDATE",
            EntityTag::EvtTime => "EVTTIME",
            EntityTag::EvtLoc => "EVTLOC",
            EntityTag::Item => "ITEM",
            EntityTag::ItemQty => "ITEMQTY",
            EntityTag::PeoQty => "PEOQTY",
            EntityTag::ScheduleItem => "SCHEDULE_ITEM",
            EntityTag::ScheduleTime => "SCHEDULE_TIME",
            EntityTag::ScheduleDuration => "SCHEDULE_DURATION",
            EntityTag::Other(tag) => tag,
        }
    }

    /// Tags that may carry the date fragment of a split document number
    pub fn is_date_like(&self) -> bool {
        matches!(self, EntityTag::DocDate | EntityTag::Date)
    }
}

impl From<&str> for EntityTag {
    fn from(raw: &str) -> Self {
        let trimmed = raw.trim();
        // Token-level recognizers prefix tags with their BIO position
        let tag = trimmed
            .strip_prefix("B-")
            .or_else(|| trimmed.strip_prefix("I-"))
            .unwrap_or(trimmed);

        match tag.to_ascii_uppercase().as_str() {
            "DOCNUM" => EntityTag::DocNum,
            "DOCDATE" => EntityTag::DocDate,
            "DATE" => EntityTag::Date,
            "CITY" => EntityTag::City,
            "SUBJECT" => EntityTag::Subject,
            "RECIPIENT" => EntityTag::Recipient,
            "RECIPIENT_POSITION" => EntityTag::RecipientPosition,
            "ORG" => EntityTag::Org,
            "EMAIL" => EntityTag::Email,
            "POSITION" => EntityTag::Position,
            "PER" => EntityTag::Per,
            "PHONE" => EntityTag::Phone,
            "EVT" => EntityTag::Evt,
            "EVTDATE" => EntityTag::EvtDate,
            "EVTTIME" => EntityTag::EvtTime,
            "EVTLOC" => EntityTag::EvtLoc,
            "ITEM" => EntityTag::Item,
            "ITEMQTY" => EntityTag::ItemQty,
            "PEOQTY" => EntityTag::PeoQty,
            "SCHEDULE_ITEM" => EntityTag::ScheduleItem,
            "SCHEDULE_TIME" => EntityTag::ScheduleTime,
            "SCHEDULE_DURATION" => EntityTag::ScheduleDuration,
            _ => EntityTag::Other(tag.to_string()),
        }
    }
}

impl From<String> for EntityTag {
    fn from(raw: String) -> Self {
        EntityTag::from(raw.as_str())
    }
}

impl From<EntityTag> for String {
    fn from(tag: EntityTag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character offsets of an entity in the document text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Characters between the end of `self` and the start of `next`.
    /// Overlapping spans have a gap of zero.
    pub fn gap_to(&self, next: &Span) -> usize {
        next.start.saturating_sub(self.end)
    }
}

/// A tagged text span produced by the recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "group")]
    pub tag: EntityTag,
    pub text: String,
    /// `None` when the recognizer record carried no usable offsets
    #[serde(flatten)]
    pub span: Option<Span>,
    pub score: f64,
}

impl Entity {
    pub fn new(tag: EntityTag, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            tag,
            text: text.into(),
            span: Some(Span::new(start, end)),
            score: 1.0,
        }
    }

    pub fn unpositioned(tag: EntityTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
            span: None,
            score: 1.0,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn start(&self) -> Option<usize> {
        self.span.map(|s| s.start)
    }

    pub fn end(&self) -> Option<usize> {
        self.span.map(|s| s.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_tags_parse_case_insensitively() {
        assert_eq!(EntityTag::from("docnum"), EntityTag::DocNum);
        assert_eq!(EntityTag::from(" SCHEDULE_TIME "), EntityTag::ScheduleTime);
        assert_eq!(EntityTag::from("RECIPIENT_POSITION"), EntityTag::RecipientPosition);
    }

    #[test]
    fn test_bio_prefix_is_stripped() {
        assert_eq!(EntityTag::from("B-PER"), EntityTag::Per);
        assert_eq!(EntityTag::from("I-EVTLOC"), EntityTag::EvtLoc);
    }

    #[test]
    fn test_unknown_tag_is_kept_verbatim() {
        let tag = EntityTag::from("LAMPIRAN");
        assert_eq!(tag, EntityTag::Other("LAMPIRAN".to_string()));
        assert_eq!(tag.to_string(), "LAMPIRAN");
    }

    #[test]
    fn test_entity_serializes_flat() {
        let entity = Entity::new(EntityTag::City, "Surabaya", 4, 12).with_score(0.5);
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "group": "CITY",
                "text": "Surabaya",
                "start": 4,
                "end": 12,
                "score": 0.5
            })
        );
    }

    #[test]
    fn test_gap_saturates_on_overlap() {
        let a = Span::new(10, 20);
        assert_eq!(a.gap_to(&Span::new(25, 30)), 5);
        assert_eq!(a.gap_to(&Span::new(15, 30)), 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any tag string survives a trip through its display form
        #[test]
        fn tag_display_reparses(raw in "[A-Za-z_]{1,20}") {
            let tag = EntityTag::from(raw.as_str());
            prop_assert_eq!(EntityTag::from(tag.to_string()), tag);
        }
    }
}
