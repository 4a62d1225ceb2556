//! Entity cleanup ahead of structural extraction

use shared_types::{Entity, EntityTag};
use tracing::{debug, instrument, warn};

use crate::config::ExtractionConfig;
use crate::patterns::{date_suffix, leading_number};

/// Clean, sort and merge raw recognizer entities.
///
/// Drops single-character ORG noise, trims people counts to their number,
/// completes truncated email addresses, then sorts by start offset and
/// re-joins document numbers the recognizer split into pieces. Running it on
/// its own output changes nothing.
///
/// When any entity lacks offsets the input order is kept and the merges,
/// which depend on adjacency, are skipped.
#[instrument(skip_all, fields(count = raw.len()))]
pub fn normalize(raw: Vec<Entity>, config: &ExtractionConfig) -> Vec<Entity> {
    let mut entities: Vec<Entity> = raw
        .into_iter()
        .filter(|entity| !is_org_noise(entity))
        .map(|entity| clean_entity(entity, config))
        .collect();

    if entities.iter().any(|entity| entity.span.is_none()) {
        warn!("Entities without offsets present, keeping recognizer order and skipping merges");
        return entities;
    }

    entities.sort_by_key(|entity| entity.start());
    let merged = merge_document_numbers(entities, config);
    debug!("Normalized to {} entities", merged.len());
    merged
}

fn is_org_noise(entity: &Entity) -> bool {
    entity.tag == EntityTag::Org && entity.text.trim().chars().count() <= 1
}

fn clean_entity(mut entity: Entity, config: &ExtractionConfig) -> Entity {
    match entity.tag {
        EntityTag::PeoQty => {
            if let Some(number) = leading_number(&entity.text) {
                entity.text = number.to_string();
            }
        }
        EntityTag::Email => {
            let truncated = !entity.text.contains('@')
                && !config
                    .known_email_domains
                    .iter()
                    .any(|domain| entity.text.contains(domain.as_str()));
            if truncated {
                entity.text = format!("{}@{}", entity.text.trim(), config.default_email_domain);
            }
        }
        _ => {}
    }
    entity
}

enum Merge {
    Continuation,
    DateSuffix(String),
}

/// Fold continuation pieces and a trailing date fragment into each DOCNUM,
/// repeating until nothing more attaches
fn merge_document_numbers(entities: Vec<Entity>, config: &ExtractionConfig) -> Vec<Entity> {
    let mut merged = Vec::with_capacity(entities.len());
    let mut iter = entities.into_iter().peekable();

    while let Some(mut current) = iter.next() {
        if current.tag == EntityTag::DocNum {
            loop {
                let merge = match iter.peek() {
                    Some(next) if is_continuation(&current, next) => Merge::Continuation,
                    Some(next) => match date_fragment(&current, next, config) {
                        Some(fragment) => Merge::DateSuffix(fragment),
                        None => break,
                    },
                    None => break,
                };
                let Some(next) = iter.next() else { break };

                match merge {
                    Merge::Continuation => {
                        current.text.push_str(&next.text.replace("/ ", "/"));
                    }
                    Merge::DateSuffix(fragment) => {
                        let base = current.text.trim();
                        let base = base.strip_suffix('/').unwrap_or(base).trim_end();
                        current.text = format!("{}/{}", base, fragment);
                    }
                }
                absorb_extent(&mut current, &next);
            }
        }
        merged.push(current);
    }

    merged
}

fn is_continuation(current: &Entity, next: &Entity) -> bool {
    next.tag == EntityTag::DocNum
        && next.start().is_some()
        && next.start() == current.end()
        && next.text.trim_start().starts_with('/')
}

fn date_fragment(current: &Entity, next: &Entity, config: &ExtractionConfig) -> Option<String> {
    if !next.tag.is_date_like() {
        return None;
    }
    let (current_span, next_span) = (current.span?, next.span?);
    if current_span.gap_to(&next_span) > config.docnum_date_max_gap {
        return None;
    }
    date_suffix(&next.text, config.min_year, config.max_year)
}

fn absorb_extent(current: &mut Entity, next: &Entity) {
    if let (Some(span), Some(next_span)) = (current.span.as_mut(), next.span) {
        span.end = span.end.max(next_span.end);
    }
    current.score = current.score.min(next.score);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(raw: Vec<Entity>) -> Vec<Entity> {
        normalize(raw, &ExtractionConfig::default())
    }

    #[test]
    fn test_docnum_continuation_and_year_merge() {
        let out = run(vec![
            Entity::new(EntityTag::DocNum, "012", 0, 3).with_score(0.9),
            Entity::new(EntityTag::DocNum, "/III", 3, 7).with_score(0.8),
            Entity::new(EntityTag::DocDate, "2024", 9, 13).with_score(0.95),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "012/III/2024");
        assert_eq!(out[0].span.map(|s| (s.start, s.end)), Some((0, 13)));
        assert_eq!(out[0].score, 0.8);
    }

    #[test]
    fn test_month_year_fragment_uses_single_slash() {
        let out = run(vec![
            Entity::new(EntityTag::DocNum, "05/DP/", 0, 6),
            Entity::new(EntityTag::Date, "VII / 2024", 7, 17),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "05/DP/VII/2024");
    }

    #[test]
    fn test_continuation_needs_touching_offsets() {
        let out = run(vec![
            Entity::new(EntityTag::DocNum, "012", 0, 3),
            Entity::new(EntityTag::DocNum, "/III", 4, 8),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_date_too_far_is_not_merged() {
        let out = run(vec![
            Entity::new(EntityTag::DocNum, "012/III", 0, 7),
            Entity::new(EntityTag::DocDate, "2024", 13, 17),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "012/III");
    }

    #[test]
    fn test_full_date_is_not_a_suffix() {
        let out = run(vec![
            Entity::new(EntityTag::DocNum, "012/III", 0, 7),
            Entity::new(EntityTag::DocDate, "12 Maret 2024", 8, 21),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_entity_cleanup() {
        let out = run(vec![
            Entity::new(EntityTag::Org, "X", 0, 1),
            Entity::new(EntityTag::PeoQty, "50 orang", 10, 18),
            Entity::new(EntityTag::Email, "parokisurabaya", 20, 34),
            Entity::new(EntityTag::Email, "info@paroki.id", 40, 54),
        ]);
        let texts: Vec<&str> = out.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["50", "parokisurabaya@gmail.com", "info@paroki.id"]);
    }

    #[test]
    fn test_output_is_sorted_by_start() {
        let out = run(vec![
            Entity::new(EntityTag::Per, "Budi", 40, 44),
            Entity::new(EntityTag::City, "Sidoarjo", 0, 8),
        ]);
        assert_eq!(out[0].tag, EntityTag::City);
    }

    #[test]
    fn test_unpositioned_input_keeps_order_and_skips_merges() {
        let out = run(vec![
            Entity::new(EntityTag::DocNum, "012", 5, 8),
            Entity::unpositioned(EntityTag::DocNum, "/III"),
            Entity::new(EntityTag::City, "Sidoarjo", 0, 4),
        ]);
        let texts: Vec<&str> = out.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["012", "/III", "Sidoarjo"]);
    }

    #[test]
    fn test_normalizing_twice_changes_nothing() {
        let once = run(vec![
            Entity::new(EntityTag::DocNum, "012", 0, 3),
            Entity::new(EntityTag::DocDate, "2024", 4, 8),
            Entity::new(EntityTag::DocDate, "2025", 10, 14),
            Entity::new(EntityTag::Email, "sekretariat", 20, 31),
        ]);
        let twice = run(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once[0].text, "012/2024/2025");
    }
}
