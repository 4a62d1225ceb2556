//! Header extraction: letter number, date, city, subjects, recipients and sender
//!
//! The header of a letter carries its identifying metadata. Entities are
//! claimed in a single left-to-right scan for the tags that need no pairing,
//! then recipients are paired with their positions and the city is paired
//! with the nearest following document date.

use shared_types::{DocumentInfo, EntityTag, Organization, Recipient};
use tracing::{debug, instrument, trace};

use crate::config::ExtractionConfig;
use crate::patterns::{clean_text, normalize_slashes};
use crate::pool::{EntityPool, Stage};
use crate::proximity::{find_nearest, Direction};

/// Tags whose first occurrence opens the header window for sender ORGs
const METADATA_TAGS: &[EntityTag] = &[
    EntityTag::Org,
    EntityTag::DocNum,
    EntityTag::DocDate,
    EntityTag::City,
    EntityTag::Subject,
    EntityTag::Recipient,
];

/// Extract [`DocumentInfo`] and hand back the pool without the claimed entities.
///
/// `document_len` is only consulted by a relative header-zone policy.
#[instrument(skip_all, fields(entities = pool.len()))]
pub fn extract_header(
    mut pool: EntityPool,
    document_len: usize,
    config: &ExtractionConfig,
) -> (DocumentInfo, EntityPool) {
    let mut builder = DocumentInfoBuilder::new();
    let zone_end = config.header_zone.limit(document_len);
    let order: Vec<usize> = pool.unclaimed().collect();

    let first_metadata_start = order
        .iter()
        .map(|&idx| pool.get(idx))
        .find(|entity| METADATA_TAGS.contains(&entity.tag))
        .and_then(|entity| entity.start());

    for &idx in &order {
        let entity = pool.get(idx);
        let claimed = match entity.tag {
            EntityTag::DocNum => {
                builder.push_number_part(&entity.text);
                true
            }
            EntityTag::Subject => {
                builder.add_subject(&entity.text);
                true
            }
            EntityTag::Email => match entity.start() {
                Some(start) if start < zone_end && !builder.has_emitter_email() => {
                    builder.set_emitter_email(&entity.text);
                    true
                }
                _ => false,
            },
            EntityTag::Org => match (entity.start(), first_metadata_start) {
                (Some(start), Some(first)) if start < first + config.header_org_window => {
                    builder.add_organization(&entity.text);
                    true
                }
                _ => false,
            },
            _ => false,
        };

        if claimed {
            trace!("Header claims {} at {}", pool.get(idx).tag, idx);
            pool.claim(idx, Stage::Header);
        }
    }

    pair_recipients(&mut pool, &mut builder, config);
    pair_city_and_date(&mut pool, &mut builder, config);

    let info = builder.build();
    debug!(
        "Header: number={:?} date={:?} city={:?} subjects={} recipients={}",
        info.document_number,
        info.document_date,
        info.document_city,
        info.subjects.len(),
        info.recipients.len()
    );
    (info, pool)
}

/// A recipient pairs only with the entity right after it, when that is a
/// RECIPIENT_POSITION close enough behind the name
fn pair_recipients(pool: &mut EntityPool, builder: &mut DocumentInfoBuilder, config: &ExtractionConfig) {
    for idx in pool.unclaimed_with(&EntityTag::Recipient) {
        let position_idx = pool.unclaimed().find(|&next| next > idx).filter(|&next| {
            let candidate = pool.get(next);
            if candidate.tag != EntityTag::RecipientPosition {
                return false;
            }
            match (pool.get(idx).span, candidate.span) {
                (Some(name), Some(position)) => {
                    position.start >= name.end
                        && name.gap_to(&position) < config.recipient_position_max_gap
                }
                // Without offsets adjacency is all there is to go on
                _ => true,
            }
        });

        let position = position_idx
            .map(|p| clean_text(&pool.get(p).text))
            .unwrap_or_default();
        builder.add_recipient(&pool.get(idx).text, position);

        pool.claim(idx, Stage::Header);
        if let Some(p) = position_idx {
            pool.claim(p, Stage::Header);
        }
    }
}

fn pair_city_and_date(
    pool: &mut EntityPool,
    builder: &mut DocumentInfoBuilder,
    config: &ExtractionConfig,
) {
    let dates = pool.unclaimed_with(&EntityTag::DocDate);

    for city_idx in pool.unclaimed_with(&EntityTag::City) {
        let Some(anchor) = pool.get(city_idx).span else {
            continue;
        };
        let nearest = find_nearest(
            anchor,
            pool.spans(&dates),
            Direction::After,
            Some(config.city_date_max_gap),
            |_| true,
        );
        if let Some(date_idx) = nearest {
            builder.set_city(&pool.get(city_idx).text);
            builder.set_document_date(&pool.get(date_idx).text);
            pool.claim(city_idx, Stage::Header);
            pool.claim(date_idx, Stage::Header);
            return;
        }
    }

    if let Some(&first) = dates.first() {
        builder.set_document_date(&pool.get(first).text);
        pool.claim(first, Stage::Header);
    }
}

/// Assembles a [`DocumentInfo`] starting from [`DocumentInfo::EMPTY`]
#[derive(Debug)]
pub struct DocumentInfoBuilder {
    info: DocumentInfo,
    number_parts: Vec<String>,
}

impl DocumentInfoBuilder {
    pub fn new() -> Self {
        Self {
            info: DocumentInfo::EMPTY,
            number_parts: Vec::new(),
        }
    }

    /// Document numbers split into several entities are joined with `/`
    pub fn push_number_part(&mut self, text: &str) {
        let part = clean_text(text);
        if !part.is_empty() && !self.number_parts.contains(&part) {
            self.number_parts.push(part);
        }
    }

    pub fn add_subject(&mut self, text: &str) {
        let subject = clean_text(text);
        if !subject.is_empty() && !self.info.subjects.contains(&subject) {
            self.info.subjects.push(subject);
        }
    }

    pub fn add_organization(&mut self, text: &str) {
        let name = clean_text(text);
        if !name.is_empty() && !self.info.emitter_organizations.iter().any(|o| o.name == name) {
            self.info.emitter_organizations.push(Organization { name });
        }
    }

    pub fn has_emitter_email(&self) -> bool {
        self.info.emitter_email.is_some()
    }

    pub fn set_emitter_email(&mut self, text: &str) {
        self.info.emitter_email = Some(clean_text(text));
    }

    pub fn add_recipient(&mut self, name: &str, position: String) {
        self.info.recipients.push(Recipient {
            name: clean_text(name),
            position,
        });
    }

    pub fn set_city(&mut self, text: &str) {
        self.info.document_city = Some(clean_text(text));
    }

    pub fn set_document_date(&mut self, text: &str) {
        self.info.document_date = Some(clean_text(text));
    }

    pub fn build(mut self) -> DocumentInfo {
        if !self.number_parts.is_empty() {
            self.info.document_number = Some(normalize_slashes(&self.number_parts.join("/")));
        }
        self.info
    }
}

impl Default for DocumentInfoBuilder {
    fn default() -> Self {
        Self::new()
    }
}
