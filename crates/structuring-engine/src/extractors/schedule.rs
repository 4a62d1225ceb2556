//! Agenda rows of an event: a SCHEDULE_ITEM with the times and duration
//! written just before it

use shared_types::{EntityTag, ScheduleItem, Span};
use tracing::trace;

use crate::config::ExtractionConfig;
use crate::patterns::clean_text;
use crate::pool::{EntityPool, Stage};
use crate::proximity::{find_nearest, Direction};

/// Build the schedule row for the SCHEDULE_ITEM at `item`, claiming the item
/// and whichever time and duration entities it takes.
///
/// The nearest preceding time is the start. When a second time sits right
/// before it the pair is read as a range, earlier one first. Times and
/// durations written before the previous agenda row belong to that row and
/// are never taken.
pub fn resolve_schedule_item(
    pool: &mut EntityPool,
    item: usize,
    config: &ExtractionConfig,
) -> ScheduleItem {
    let mut row = ScheduleItem {
        description: clean_text(&pool.get(item).text),
        ..ScheduleItem::default()
    };
    pool.claim(item, Stage::Event);

    let Some(anchor) = pool.get(item).span else {
        return row;
    };

    let floor = previous_row_end(pool, item, anchor);
    let times = pool.unclaimed_with(&EntityTag::ScheduleTime);
    let nearer = preceding(pool, anchor, floor, &times, config.schedule_time_max_gap, None);
    let farther = nearer.and_then(|n| {
        preceding(pool, anchor, floor, &times, config.schedule_time_max_gap, Some(n))
    });

    match (nearer, farther) {
        (Some(nearer), Some(farther)) if forms_range(pool, nearer, farther, config) => {
            trace!("Time range for schedule item {}", item);
            row.start_time = clean_text(&pool.get(farther).text);
            row.end_time = clean_text(&pool.get(nearer).text);
            pool.claim(farther, Stage::Event);
            pool.claim(nearer, Stage::Event);
        }
        (Some(nearer), _) => {
            row.start_time = clean_text(&pool.get(nearer).text);
            pool.claim(nearer, Stage::Event);
        }
        (None, _) => {}
    }

    let durations = pool.unclaimed_with(&EntityTag::ScheduleDuration);
    if let Some(duration) = preceding(
        pool,
        anchor,
        floor,
        &durations,
        config.schedule_duration_max_gap,
        None,
    ) {
        row.duration = clean_text(&pool.get(duration).text);
        pool.claim(duration, Stage::Event);
    }

    row
}

/// End of the closest SCHEDULE_ITEM that finishes before `anchor` starts
fn previous_row_end(pool: &EntityPool, item: usize, anchor: Span) -> usize {
    (0..pool.len())
        .filter(|&idx| idx != item && pool.get(idx).tag == EntityTag::ScheduleItem)
        .filter_map(|idx| pool.get(idx).end())
        .filter(|&end| end <= anchor.start)
        .max()
        .unwrap_or(0)
}

fn preceding(
    pool: &EntityPool,
    anchor: Span,
    floor: usize,
    candidates: &[usize],
    max_gap: usize,
    skip: Option<usize>,
) -> Option<usize> {
    find_nearest(
        anchor,
        pool.spans(candidates),
        Direction::Before,
        Some(max_gap),
        |idx| {
            Some(idx) != skip
                && !pool.is_claimed(idx)
                && pool.get(idx).start().is_some_and(|start| start >= floor)
        },
    )
}

fn forms_range(pool: &EntityPool, nearer: usize, farther: usize, config: &ExtractionConfig) -> bool {
    match (pool.get(nearer).span, pool.get(farther).span) {
        (Some(nearer), Some(farther)) => {
            nearer.start.saturating_sub(farther.end) < config.schedule_range_gap
        }
        _ => false,
    }
}
