//! Signature blocks: a run of POSITION entities followed by a run of PER entities
//!
//! Letters close with one or more "jabatan / nama" pairs. They appear either
//! as a single signatory whose title and name were recognized in pieces, or
//! as side-by-side columns where each title sits above its own name.

use shared_types::{EntityTag, SignatureBlock};
use tracing::{debug, instrument, trace};

use crate::config::ExtractionConfig;
use crate::patterns::clean_text;
use crate::pool::{EntityPool, Stage};

#[instrument(skip_all, fields(entities = pool.len()))]
pub fn extract_signatures(
    mut pool: EntityPool,
    config: &ExtractionConfig,
) -> (Vec<SignatureBlock>, EntityPool) {
    let order: Vec<usize> = pool.unclaimed().collect();
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while cursor < order.len() {
        if pool.get(order[cursor]).tag != EntityTag::Position {
            cursor += 1;
            continue;
        }

        let positions = collect_run(&pool, &order[cursor..], &EntityTag::Position, config);
        let after_positions = cursor + positions.len();

        let names = match (order.get(after_positions), positions.last()) {
            (Some(&first_name), Some(&last_position))
                if within_reach(&pool, last_position, first_name, config) =>
            {
                collect_run(&pool, &order[after_positions..], &EntityTag::Per, config)
            }
            _ => Vec::new(),
        };

        if names.is_empty() {
            trace!("Position run at {} has no signatory name", order[cursor]);
            cursor = after_positions;
            continue;
        }

        let titles = fragments(&pool, &positions, config.signature_fragment_gap);
        let people = fragments(&pool, &names, config.signature_fragment_gap);

        if titles.len() == people.len() && titles.len() > 1 {
            // Side-by-side columns
            blocks.extend(
                titles
                    .into_iter()
                    .zip(people)
                    .map(|(position, name)| SignatureBlock { position, name }),
            );
        } else {
            blocks.push(SignatureBlock {
                position: titles.join(" "),
                name: people.join(" "),
            });
        }

        for &idx in positions.iter().chain(names.iter()) {
            pool.claim(idx, Stage::Signature);
        }
        cursor = after_positions + names.len();
    }

    debug!("Found {} signature blocks", blocks.len());
    (blocks, pool)
}

/// Leading members of `order` tagged `tag` with at most `signature_run_gap`
/// characters between neighbours
fn collect_run(
    pool: &EntityPool,
    order: &[usize],
    tag: &EntityTag,
    config: &ExtractionConfig,
) -> Vec<usize> {
    let mut run: Vec<usize> = Vec::new();

    for &idx in order {
        let entity = pool.get(idx);
        if &entity.tag != tag {
            break;
        }
        if let Some(&prev) = run.last() {
            let adjacent = match (pool.get(prev).span, entity.span) {
                (Some(a), Some(b)) => a.gap_to(&b) <= config.signature_run_gap,
                _ => false,
            };
            if !adjacent {
                break;
            }
        }
        run.push(idx);
    }

    run
}

fn within_reach(pool: &EntityPool, last_position: usize, first_name: usize, config: &ExtractionConfig) -> bool {
    let name = pool.get(first_name);
    if name.tag != EntityTag::Per {
        return false;
    }
    match (pool.get(last_position).span, name.span) {
        (Some(a), Some(b)) => a.gap_to(&b) <= config.signature_name_reach,
        _ => false,
    }
}

/// Join run members that sit within `fragment_gap` characters of each other
/// into one phrase. Touching pieces are glued, spaced ones joined by a space.
fn fragments(pool: &EntityPool, run: &[usize], fragment_gap: usize) -> Vec<String> {
    let mut phrases: Vec<String> = Vec::new();
    let mut prev_end: Option<usize> = None;

    for &idx in run {
        let entity = pool.get(idx);
        let text = clean_text(&entity.text);
        let gap = match (prev_end, entity.start()) {
            (Some(end), Some(start)) => Some(start.saturating_sub(end)),
            _ => None,
        };

        match (phrases.last_mut(), gap) {
            (Some(last), Some(gap)) if gap <= fragment_gap => {
                if gap > 0 {
                    last.push(' ');
                }
                last.push_str(&text);
            }
            _ => phrases.push(text),
        }
        prev_end = entity.end();
    }

    phrases
}
